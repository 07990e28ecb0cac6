//! Source (UAC1 microphone) interface construction and the paced TX task.
//! Grounded on `usb_audio_start_source`/`source_buffer_hook` in
//! `original_source/usb_audio.c`; no feature unit, no feedback endpoint.

use embassy_usb::driver::{Driver, Endpoint, EndpointError, EndpointIn};
use embassy_usb::Builder;

use crate::descriptors::records::USB_DT_CS_INTERFACE;
use crate::descriptors::DescriptorLayout;
use crate::hooks::MixerHook;
use crate::source::SourcePipeline;

const AUDIO_CLASS: u8 = 0x01;
const SUBCLASS_CONTROL: u8 = 0x01;
const SUBCLASS_STREAMING: u8 = 0x02;
const PROTOCOL_UNDEFINED: u8 = 0x00;
const TX_FRAME_SIZE: u16 = 192;

pub struct SourceEndpoints<'d, D: Driver<'d>> {
    pub stream_in: D::EndpointIn,
}

pub fn build<'d, D: Driver<'d>>(
    builder: &mut Builder<'d, D>,
    freq_table_ascending: &'static [u32],
    high_speed: bool,
) -> SourceEndpoints<'d, D> {
    let interval = if high_speed { 4 } else { 1 };

    let mut func = builder.function(AUDIO_CLASS, SUBCLASS_CONTROL, PROTOCOL_UNDEFINED);
    let mut ac_iface = func.interface();
    let as_iface_num = ac_iface.interface_number().0 + 1;
    let layout = DescriptorLayout::Source { freq_table_ascending, high_speed };
    let asm = layout.assemble(as_iface_num);

    let mut ac_alt = ac_iface.alt_setting(AUDIO_CLASS, SUBCLASS_CONTROL, PROTOCOL_UNDEFINED, None);
    ac_alt.descriptor(USB_DT_CS_INTERFACE, &asm.ac);

    let mut as_iface = func.interface();
    let _ = as_iface.alt_setting(AUDIO_CLASS, SUBCLASS_STREAMING, PROTOCOL_UNDEFINED, None);
    let mut as_alt = as_iface.alt_setting(AUDIO_CLASS, SUBCLASS_STREAMING, PROTOCOL_UNDEFINED, None);

    as_alt.descriptor(USB_DT_CS_INTERFACE, &asm.as_general);
    as_alt.descriptor(USB_DT_CS_INTERFACE, &asm.format_type_i);

    let stream_in = as_alt.endpoint_isochronous_in(TX_FRAME_SIZE, interval);

    SourceEndpoints { stream_in }
}

#[derive(Debug)]
pub struct Disconnected;

impl From<EndpointError> for Disconnected {
    fn from(_: EndpointError) -> Self {
        Disconnected
    }
}

/// Paced TX loop: one `next_tx_frame` call per ISO IN completion, primed
/// with a silence frame before the first real one per §4.2.
pub async fn stream_task<'d, D: Driver<'d>, M: MixerHook>(
    ep: &mut D::EndpointIn,
    pipeline: &mut SourcePipeline<M>,
) -> Result<(), Disconnected> {
    let mut scratch = [0u8; TX_FRAME_SIZE as usize];
    let mut out = [0u8; TX_FRAME_SIZE as usize];
    loop {
        ep.wait_enabled().await;
        pipeline.start();
        loop {
            pipeline.feed_from_mixer(&mut scratch);
            let n = pipeline.next_tx_frame(&mut out);
            if let Err(e) = ep.write(&out[..n]).await {
                if matches!(e, EndpointError::Disabled) {
                    break;
                }
                return Err(e.into());
            }
        }
        pipeline.stop();
    }
}
