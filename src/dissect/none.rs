use crate::dissect::{PktBuf, PrintMode, Stage};

/// Entry stage for link types nothing knows how to dissect: consumes
/// nothing, prints nothing, chooses no successor.
pub static NONE: NoneStage = NoneStage;

pub struct NoneStage;

impl Stage for NoneStage {
    fn name(&self) -> &'static str {
        "none"
    }

    fn step(&self, _pkt: &mut PktBuf<'_>, _mode: PrintMode, _out: &mut String) {}
}

/// The usual exit stage: terminates the packet's output with a blank line.
pub static NEWLINE: NewlineStage = NewlineStage;

pub struct NewlineStage;

impl Stage for NewlineStage {
    fn name(&self) -> &'static str {
        "newline"
    }

    fn step(&self, _pkt: &mut PktBuf<'_>, _mode: PrintMode, out: &mut String) {
        out.push('\n');
    }
}
