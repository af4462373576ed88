use alloc::vec::Vec;

use crate::profile::{check_key_order, validate_big_digits};
use crate::value::Value;
use crate::BencodeError;

/// Check that an owned tree is canonical as built.
///
/// Trees produced by [`crate::decode`] in strict mode, by [`crate::Dictionary::insert`], or by the
/// `bencode!` macro always pass. Trees assembled with [`crate::Dictionary::push`] or
/// [`crate::Dictionary::from_unordered`] may not; [`crate::encode`] normalizes those, this
/// function reports them.
///
/// Errors carry offset `0`: an owned tree has no input position.
///
/// # Errors
///
/// Returns `UnsortedKeys` or `DuplicateKey` for a dictionary whose recorded keys are not strictly
/// ascending, and `BigIntNotCanonical` / `BigIntInI64Range` for a malformed big integer.
pub fn validate(value: &Value) -> Result<(), BencodeError> {
    let mut stack: Vec<&Value> = Vec::new();
    stack.push(value);
    while let Some(v) = stack.pop() {
        match v {
            Value::Integer(i) => {
                if let Some(big) = i.as_bigint() {
                    validate_big_digits(big.is_negative(), big.digits())
                        .map_err(|code| BencodeError::new(code, 0))?;
                }
            }
            Value::ByteString(_) => {}
            Value::List(items) => stack.extend(items.iter()),
            Value::Dictionary(d) => {
                for pair in d.entries().windows(2) {
                    check_key_order(&pair[0].0, &pair[1].0)
                        .map_err(|code| BencodeError::new(code, 0))?;
                }
                stack.extend(d.values());
            }
        }
    }
    Ok(())
}
