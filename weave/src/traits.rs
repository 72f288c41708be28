//! Seams between the pipeline and its collaborators: the transport that
//! fetches a source, and the per-platform dialects that render the model.

use std::io::{Read, Write};

use crate::{error::Error, types::Record};

/// Fetches the raw CSV bytes behind a source URL.
///
/// Any `Err` is treated as a soft failure by the ingestor: the source is
/// skipped and the run continues.
///
/// # Example
///
/// ```rust
/// use std::io::{Cursor, Read};
/// use weave::{Error, traits::Fetch};
///
/// struct Fixed(&'static str);
///
/// impl Fetch for Fixed {
///     fn fetch(&self, _url: &str) -> Result<Box<dyn Read>, Error> {
///         Ok(Box::new(Cursor::new(self.0)))
///     }
/// }
///
/// let mut body = String::new();
/// Fixed("key,en\n").fetch("any")?.read_to_string(&mut body)?;
/// assert_eq!(body, "key,en\n");
/// # Ok::<(), weave::Error>(())
/// ```
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>, Error>;
}

/// Renders one language of the strings model in a platform's file format.
///
/// A dialect is picked once per output file and then driven in order:
/// header, every record, footer. A dialect may carry state between calls.
pub trait StringsDialect {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error>;

    /// Writes one record, or nothing if the dialect has no rendering for it.
    fn write_record(
        &mut self,
        out: &mut dyn Write,
        record: &Record,
        language: &str,
    ) -> Result<(), Error>;

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error>;
}

/// Renders analytics constants in a platform's file format.
///
/// The document always opens in the events section; `open_screens` is called
/// at most once, right before the first non-event constant.
pub trait AnalyticsDialect {
    fn write_header(&mut self, out: &mut dyn Write) -> Result<(), Error>;

    fn open_screens(&mut self, out: &mut dyn Write) -> Result<(), Error>;

    fn write_constant(&mut self, out: &mut dyn Write, key: &str, tag: &str)
    -> Result<(), Error>;

    fn write_footer(&mut self, out: &mut dyn Write) -> Result<(), Error>;
}
