//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values; two
/// with the same values are the same thing. To "modify" one, build a new one.
///
/// Example: commission terms of `{ percentage, 500 bp }` are interchangeable
/// wherever they appear, while two vehicles with identical attributes are
/// still distinct entities.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
