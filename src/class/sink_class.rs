//! Sink (UAC1 speaker) interface construction and stream/feedback tasks.
//! Grounded on the teacher's `usb_streaming_task`/`usb_feedback_task` pair
//! and on `usb_audio_rx_complete`/feedback emission in
//! `original_source/usb_audio.c`.

use embassy_usb::driver::{Driver, Endpoint, EndpointError, EndpointIn, EndpointOut};
use embassy_usb::Builder;

use crate::descriptors::records::{USB_DT_CS_ENDPOINT, USB_DT_CS_INTERFACE};
use crate::descriptors::DescriptorLayout;
use crate::hooks::DspSink;
use crate::sink::SinkPipeline;

const AUDIO_CLASS: u8 = 0x01;
const SUBCLASS_CONTROL: u8 = 0x01;
const SUBCLASS_STREAMING: u8 = 0x02;
const PROTOCOL_UNDEFINED: u8 = 0x00;

pub struct SinkEndpoints<'d, D: Driver<'d>> {
    pub stream_out: D::EndpointOut,
    pub feedback_in: D::EndpointIn,
}

/// Registers the AC header (bInCollection = 2) and the playback AS
/// interface (alt 0 zero-bandwidth, alt 1 streaming) on `builder`, writing
/// the class-specific descriptor bytes produced by [`assemble_sink`].
pub fn build<'d, D: Driver<'d>>(
    builder: &mut Builder<'d, D>,
    freq_table: &'static [u32],
    high_speed: bool,
) -> SinkEndpoints<'d, D> {
    let max_packet_size: u16 = if high_speed { 1024 } else { 192 };
    let interval = if high_speed { 4 } else { 1 };

    let mut func = builder.function(AUDIO_CLASS, SUBCLASS_CONTROL, PROTOCOL_UNDEFINED);
    let mut ac_iface = func.interface();
    let as_iface_num = ac_iface.interface_number().0 + 1;
    let layout = DescriptorLayout::Sink { freq_table };
    let asm = layout.assemble(as_iface_num);

    let mut ac_alt = ac_iface.alt_setting(AUDIO_CLASS, SUBCLASS_CONTROL, PROTOCOL_UNDEFINED, None);
    ac_alt.descriptor(USB_DT_CS_INTERFACE, &asm.ac);

    let mut as_iface = func.interface();
    let _ = as_iface.alt_setting(AUDIO_CLASS, SUBCLASS_STREAMING, PROTOCOL_UNDEFINED, None);
    let mut as_alt = as_iface.alt_setting(AUDIO_CLASS, SUBCLASS_STREAMING, PROTOCOL_UNDEFINED, None);

    as_alt.descriptor(USB_DT_CS_INTERFACE, &asm.as_general);
    as_alt.descriptor(USB_DT_CS_INTERFACE, &asm.format_type_i);

    let stream_out = as_alt.endpoint_isochronous_out(max_packet_size, interval);
    as_alt.descriptor(USB_DT_CS_ENDPOINT, &asm.data_endpoint[2..]);
    let feedback_in = as_alt.endpoint_isochronous_in(4, interval);
    as_alt.descriptor(USB_DT_CS_ENDPOINT, &asm.sync_endpoint.unwrap()[2..]);

    SinkEndpoints { stream_out, feedback_in }
}

#[derive(Debug)]
pub struct Disconnected;

impl From<EndpointError> for Disconnected {
    fn from(_: EndpointError) -> Self {
        Disconnected
    }
}

/// Drains completed ISO OUT transfers into the sink pipeline and emits
/// feedback on the same frame clock, in the same task. The original keeps
/// `usb_audio_rx_complete` and feedback emission in one interrupt-domain
/// context (domain A, per the concurrency mapping); running them as one
/// embassy task rather than two preserves that and avoids needing two
/// live `&mut` borrows of one `SinkPipeline`.
pub async fn run<'d, D: Driver<'d>, Dsp: DspSink>(
    stream_out: &mut D::EndpointOut,
    feedback_in: &mut D::EndpointIn,
    pipeline: &mut SinkPipeline<Dsp>,
) -> Result<(), Disconnected> {
    let mut frame_number: u16 = 0;
    let mut buf = [0u8; 1024];
    loop {
        stream_out.wait_enabled().await;
        loop {
            let n = match stream_out.read(&mut buf).await {
                Ok(n) => n,
                Err(EndpointError::Disabled) => break,
                Err(e) => return Err(e.into()),
            };
            pipeline.on_rx_complete(frame_number, &buf[..n]);
            if let Some(packet) = pipeline.tick_feedback(frame_number) {
                match feedback_in.write(&packet).await {
                    Ok(()) | Err(EndpointError::Disabled) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            frame_number = frame_number.wrapping_add(1) & 0x07FF;
        }
    }
}
