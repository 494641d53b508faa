#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// `(p, q, g)` do not describe a prime-order subgroup of `Z_p*`
    InvalidGroupParameters,
    /// Value is not an element of the order-`q` subgroup
    InvalidGroupElement,
    /// Exponent outside `[0, q)`
    ScalarOutOfRange,
    /// No group parameters registered under this name
    UnknownGroup(String),
}
