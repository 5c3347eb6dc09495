/// Host-observable execution state of a processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Program loaded, no step executed yet.
    #[default]
    Ready,
    /// At least one step executed and the program has not finished.
    Running,
    /// `HALT` executed or the program counter ran past the program.
    Halted,
}

impl RunState {
    /// Returns `true` once no further step will execute.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        matches!(self, Self::Halted)
    }
}
