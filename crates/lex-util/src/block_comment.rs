//! Handling nested block comments delimited with `(*` and `*)`.

/// A marker signifying a block comment was consumed.
#[derive(Debug)]
pub struct Consumed;

/// An error for an unclosed comment.
#[derive(Debug)]
pub struct UnclosedError;

/// Consumes a block comment starting at `*idx`, if there is one.
///
/// # Errors
///
/// If the comment was not closed before the end of the input. In that case `*idx` is left at the
/// end of the input.
pub fn get(idx: &mut usize, bs: &[u8]) -> Result<Option<Consumed>, UnclosedError> {
  if bs.get(*idx) != Some(&b'(') || bs.get(*idx + 1) != Some(&b'*') {
    return Ok(None);
  }
  *idx += 2;
  let mut level = 1_usize;
  loop {
    match (bs.get(*idx), bs.get(*idx + 1)) {
      (Some(&b'('), Some(&b'*')) => {
        *idx += 2;
        level += 1;
      }
      (Some(&b'*'), Some(&b')')) => {
        *idx += 2;
        level -= 1;
        if level == 0 {
          return Ok(Some(Consumed));
        }
      }
      (Some(_), Some(_)) => *idx += 1,
      (Some(_), None) => {
        *idx += 1;
        return Err(UnclosedError);
      }
      (None, _) => return Err(UnclosedError),
    }
  }
}
