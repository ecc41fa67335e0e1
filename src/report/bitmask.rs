use serde::Serialize;
use std::collections::BTreeMap;

/// Most options a single digit can carry (bits of an octal digit)
pub const MAX_OPTIONS: usize = 3;

/// Errors from bitmask validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitmaskError {
    /// Mask does not have the expected number of digits
    #[error("Bitmask '{mask}' has {found} digits, expected {expected}")]
    WrongLength {
        /// Offending mask
        mask: String,
        /// Required number of digits
        expected: usize,
        /// Digits found
        found: usize,
    },

    /// A character is not a digit in `0..=max`
    #[error("Bitmask digit '{digit}' at position {position} is out of range 0-{max}")]
    DigitOutOfRange {
        /// Zero-based position in the mask
        position: usize,
        /// Offending character
        digit: char,
        /// Largest allowed digit
        max: u8,
    },

    /// More options than bits in a digit
    #[error("{0} options requested, a digit holds at most {MAX_OPTIONS}")]
    TooManyOptions(usize),
}

/// Largest digit value for `n_options` bits: 0, 1, 3 or 7.
pub fn max_digit(n_options: usize) -> Result<u8, BitmaskError> {
    if n_options > MAX_OPTIONS {
        return Err(BitmaskError::TooManyOptions(n_options));
    }
    Ok((1u8 << n_options) - 1)
}

/// Check that `mask` has exactly `n_digits` digits, each at most
/// `2^n_options - 1`.
pub fn validate(mask: &str, n_options: usize, n_digits: usize) -> Result<(), BitmaskError> {
    let max = max_digit(n_options)?;

    let found = mask.chars().count();
    if found != n_digits {
        return Err(BitmaskError::WrongLength {
            mask: mask.to_string(),
            expected: n_digits,
            found,
        });
    }

    for (position, digit) in mask.chars().enumerate() {
        match digit.to_digit(10) {
            Some(value) if value <= u32::from(max) => {}
            _ => {
                return Err(BitmaskError::DigitOutOfRange {
                    position,
                    digit,
                    max,
                })
            }
        }
    }
    Ok(())
}

/// Options decoded from one digit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitOptions {
    /// Name of the digit position
    pub name: String,
    /// Option names with their bit, in option order
    pub options: Vec<(String, bool)>,
}

/// Decoded bitmask: one row of option flags per digit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionMatrix {
    digits: Vec<DigitOptions>,
}

impl OptionMatrix {
    /// Rows in digit order
    pub fn digits(&self) -> &[DigitOptions] {
        &self.digits
    }

    /// Flag of `option` for `digit`, if both names exist
    pub fn get(&self, digit: &str, option: &str) -> Option<bool> {
        self.digits
            .iter()
            .find(|d| d.name == digit)?
            .options
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, set)| *set)
    }

    /// Options switched on for `digit`
    pub fn enabled(&self, digit: &str) -> Vec<&str> {
        self.digits
            .iter()
            .filter(|d| d.name == digit)
            .flat_map(|d| d.options.iter())
            .filter(|(_, set)| *set)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Nested map `digit -> option -> flag`
    pub fn to_map(&self) -> BTreeMap<String, BTreeMap<String, bool>> {
        self.digits
            .iter()
            .map(|d| (d.name.clone(), d.options.iter().cloned().collect()))
            .collect()
    }
}

/// Decode `mask` into an [`OptionMatrix`].
///
/// Digit `i` of the mask is named `digit_names[i]`; bit `j` (least
/// significant first) of its value sets `options[j]`. The mask is validated
/// against the number of names and options first.
pub fn parse<D, O>(mask: &str, digit_names: &[D], options: &[O]) -> Result<OptionMatrix, BitmaskError>
where
    D: AsRef<str>,
    O: AsRef<str>,
{
    validate(mask, options.len(), digit_names.len())?;

    let digits = mask
        .chars()
        .zip(digit_names)
        .map(|(digit, name)| {
            // validated above
            let value = digit.to_digit(10).unwrap_or(0);
            DigitOptions {
                name: name.as_ref().to_string(),
                options: options
                    .iter()
                    .enumerate()
                    .map(|(bit, option)| (option.as_ref().to_string(), value & (1u32 << bit) != 0))
                    .collect(),
            }
        })
        .collect();

    Ok(OptionMatrix { digits })
}
