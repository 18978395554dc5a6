use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SizeDecision {
    UseConverted,
    UseOriginal,
}

/// Keeps the original only when conversion made it strictly larger. Ties go
/// to the converted artifact.
pub fn decide(original_size: u64, converted_size: u64) -> SizeDecision {
    if converted_size > original_size {
        SizeDecision::UseOriginal
    } else {
        SizeDecision::UseConverted
    }
}
