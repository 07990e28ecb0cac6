//! Descriptor layout selection and byte assembly, §4.5/§6.

pub mod assemble;
pub mod layout;
pub mod records;

pub use assemble::{assemble_sink, assemble_source, Assembled};
pub use layout::DescriptorLayout;

impl DescriptorLayout {
    pub fn assemble(&self, streaming_interface: u8) -> Assembled {
        match *self {
            DescriptorLayout::Sink { freq_table } => assemble_sink(streaming_interface, freq_table),
            DescriptorLayout::Source { freq_table_ascending, high_speed } => {
                assemble_source(streaming_interface, freq_table_ascending, high_speed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_layout_assembles_via_enum() {
        let layout = DescriptorLayout::Sink { freq_table: &[48_000, 44_100] };
        let asm = layout.assemble(1);
        assert!(asm.ac.len() > 8);
        assert!(asm.sync_endpoint.is_some());
    }

    #[test]
    fn source_layout_assembles_via_enum() {
        let layout = DescriptorLayout::Source { freq_table_ascending: &[44_100, 48_000], high_speed: true };
        let asm = layout.assemble(2);
        assert!(asm.ac.len() > 8);
        assert!(asm.sync_endpoint.is_none());
    }
}
