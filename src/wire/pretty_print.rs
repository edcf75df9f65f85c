/*! Pretty-printing of element trees and raw packets.

Every element describes itself as an explicit list of named fields through the
[`Fields`] trait. From that one declaration, [`render`] produces the multi-line
indented form used by the `Display` implementations of messages and options:

```text
Solicit(
  transaction_id=1193046,
  options=[
    ClientIdOption(duid=0x00030001020000000001),
    ElapsedTimeOption(elapsed_time=0),
  ],
)
```

Elements with no fields, or with a single field whose value fits on one line,
are rendered on one line.

The [`PrettyPrinter`] renders a raw buffer by decoding it first:

```
use dhcpv6_wire::wire::{Dhcpv6Packet, PrettyPrinter};

static UNKNOWN: [u8; 3] = [0xc8, 0xaa, 0xbb];
print!("{}", PrettyPrinter::<Dhcpv6Packet<&'static [u8]>>::new("", &UNKNOWN));
```
*/

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};
use core::marker::PhantomData;

/// The value of one declared field of an element.
pub enum FieldValue<'a> {
    /// A value rendered with its `Display` implementation.
    Scalar(&'a dyn fmt::Display),
    /// A sequence of values rendered with their `Display` implementations.
    Scalars(Vec<&'a dyn fmt::Display>),
    /// An octet string, rendered as hexadecimal.
    Bytes(&'a [u8]),
    /// A text string, rendered between quotes.
    Text(&'a str),
    /// A nested element.
    Element(&'a dyn Fields),
    /// A sequence of nested elements.
    List(Vec<&'a dyn Fields>),
}

/// An element that describes its state as an ordered list of named fields.
///
/// The field names match the public field names of the element, so that the
/// rendered form reads like a constructor call.
pub trait Fields {
    /// Return the name of the concrete element kind.
    fn element_name(&self) -> &'static str;

    /// Return the declared fields, in declaration order.
    fn fields(&self) -> Vec<(&'static str, FieldValue<'_>)>;
}

/// Display an octet string as hexadecimal.
#[derive(Debug, Clone, Copy)]
pub struct Hex<'a>(pub &'a [u8]);

impl<'a> fmt::Display for Hex<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Display a string between single quotes.
#[derive(Debug, Clone, Copy)]
pub struct Quoted<'a>(pub &'a str);

impl<'a> fmt::Display for Quoted<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(value) => {
            let mut out = String::new();
            let _ = write!(out, "{value}");
            out
        }
        FieldValue::Scalars(values) => {
            let mut out = String::from("[");
            for (i, value) in values.iter().enumerate() {
                if i != 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{value}");
            }
            out.push(']');
            out
        }
        FieldValue::Bytes(bytes) => {
            let mut out = String::new();
            let _ = write!(out, "{}", Hex(bytes));
            out
        }
        FieldValue::Text(text) => {
            let mut out = String::new();
            let _ = write!(out, "{}", Quoted(text));
            out
        }
        FieldValue::Element(element) => render(*element),
        FieldValue::List(elements) if elements.is_empty() => String::from("[]"),
        FieldValue::List(elements) => {
            let mut out = String::from("[\n");
            for element in elements {
                let rendered = render(*element);
                let mut lines = rendered.lines().peekable();
                while let Some(line) = lines.next() {
                    out.push_str("  ");
                    out.push_str(line);
                    if lines.peek().is_none() {
                        out.push(',');
                    }
                    out.push('\n');
                }
            }
            out.push(']');
            out
        }
    }
}

/// Render an element as an indented tree.
pub fn render(element: &dyn Fields) -> String {
    let fields = element.fields();
    let mut out = String::from(element.element_name());
    out.push('(');

    if let [(name, value)] = fields.as_slice() {
        let rendered = render_value(value);
        if !rendered.contains('\n') {
            let _ = write!(out, "{name}={rendered})");
            return out;
        }
    } else if fields.is_empty() {
        out.push(')');
        return out;
    }

    out.push('\n');
    for (name, value) in fields.iter() {
        let rendered = render_value(value);
        let mut lines = rendered.lines();
        if let Some(first) = lines.next() {
            let _ = write!(out, "  {name}={first}");
        }
        for line in lines {
            let _ = write!(out, "\n  {line}");
        }
        out.push_str(",\n");
    }
    out.push(')');
    out
}

/// Indentation state.
#[derive(Debug)]
pub struct PrettyIndent {
    prefix: &'static str,
    level: usize,
}

impl PrettyIndent {
    /// Create an indentation state. The entire listing will be indented by the width
    /// of `prefix`, and `prefix` will appear at the start of the first line.
    pub fn new(prefix: &'static str) -> PrettyIndent {
        PrettyIndent { prefix, level: 0 }
    }

    /// Increase indentation level.
    pub fn increase(&mut self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f)?;
        self.level += 1;
        Ok(())
    }
}

impl fmt::Display for PrettyIndent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.level == 0 {
            write!(f, "{}", self.prefix)
        } else {
            write!(f, "{0:1$}{0:2$}\\ ", "", self.prefix.len(), self.level * 2)
        }
    }
}

/// Interface for printing listings.
pub trait PrettyPrint {
    /// Write a concise, formatted representation of a packet contained in the provided
    /// buffer, and any nested packets it may contain.
    ///
    /// `pretty_print` accepts a buffer and not a packet wrapper because the packet might
    /// be truncated, and so it might not be possible to create the packet wrapper.
    fn pretty_print(
        buffer: &dyn AsRef<[u8]>,
        fmt: &mut fmt::Formatter,
        indent: &mut PrettyIndent,
    ) -> fmt::Result;
}

/// Wrapper for using a `PrettyPrint` where a `Display` is expected.
pub struct PrettyPrinter<'a, T: PrettyPrint> {
    prefix: &'static str,
    buffer: &'a dyn AsRef<[u8]>,
    phantom: PhantomData<T>,
}

impl<'a, T: PrettyPrint> PrettyPrinter<'a, T> {
    /// Format the listing with the recorded parameters when Display::fmt is called.
    pub fn new(prefix: &'static str, buffer: &'a dyn AsRef<[u8]>) -> PrettyPrinter<'a, T> {
        PrettyPrinter {
            prefix: prefix,
            buffer: buffer,
            phantom: PhantomData,
        }
    }
}

impl<'a, T: PrettyPrint + AsRef<[u8]>> PrettyPrinter<'a, T> {
    /// Create a `PrettyPrinter` which prints the given object.
    pub fn print(printable: &'a T) -> PrettyPrinter<'a, T> {
        PrettyPrinter {
            prefix: "",
            buffer: printable,
            phantom: PhantomData,
        }
    }
}

impl<'a, T: PrettyPrint> fmt::Display for PrettyPrinter<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        T::pretty_print(&self.buffer, f, &mut PrettyIndent::new(self.prefix))
    }
}
