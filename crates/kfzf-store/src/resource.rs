use kfzf_core::RawObject;

/// Per-kind adapter turning raw objects into dump records.
///
/// One implementation exists per resource kind; a [`crate::Store`] is
/// parameterized by it once, at construction.
pub trait Resource: Send + 'static {
    /// Resource kind name. Also the file name of the dump.
    const NAME: &'static str;

    /// Space-separated field names written as the first line of every dump.
    const HEADER: &'static str;

    /// Builds a record from a raw object.
    ///
    /// Must not fail: missing or malformed fields degrade to placeholders.
    fn from_raw(obj: &RawObject) -> Self;

    /// Whether `self` differs from `previous` in a way that needs the dump rewritten.
    fn has_changed(&self, previous: &Self) -> bool;

    /// Renders the record as one line, without a trailing newline.
    ///
    /// Fields are separated by a single space and must not contain spaces or newlines.
    fn render(&self) -> String;
}
