use clap::ValueEnum;

/// CLI-facing pattern selector. Serializes to the same tag space as
/// [`crate::config::PatternParams::type_tag`], except "viral" maps to the
/// internal "viral_spike" tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternKind {
    Bursty,
    Diurnal,
    Viral,
}
