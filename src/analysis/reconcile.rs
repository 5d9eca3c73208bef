use super::classify::DataShape;
use super::Mismatch;
use crate::syntax::Argument;

/// Compare the placeholders a statement needs against the arguments bound at
/// the call site, returning the accepted count.
///
/// A spread argument list (`args...`) has a length only known at runtime, so
/// as long as the statement needs parameters and something is passed, the call
/// is accepted as-is.
pub fn reconcile(
    shape: DataShape,
    required: usize,
    supplied: &[Argument],
    spread: bool,
) -> Result<usize, Mismatch> {
    if required > 0 && spread && !supplied.is_empty() {
        return Ok(required);
    }
    if supplied.len() != required {
        return Err(Mismatch::ArgumentCount {
            shape,
            required,
            supplied: supplied.len(),
        });
    }
    Ok(required)
}
