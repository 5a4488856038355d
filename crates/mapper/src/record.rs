//! `impl_record!`: derive `Mapped` for a struct from its field tags
//!
//! ```
//! use strata_mapper::impl_record;
//!
//! #[derive(Debug, Default)]
//! struct Book {
//!     title: String,
//!     pages: i32,
//!     tags: Vec<String>,
//! }
//!
//! impl_record!(Book {
//!     title => "title",
//!     pages => "pages",
//!     tags => "tags",
//! });
//! ```
//!
//! Each tag is normalized (surrounding `/` trimmed, inner `/` replaced by
//! `-`) and becomes the field's path segment. A tag that normalizes to the
//! empty string leaves the field unmapped.

/// Implement [`Mapped`](crate::Mapped) for a record type
///
/// Fields are listed as `field => "tag"`. Every field type must itself
/// implement `Mapped`.
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident => $tag:expr),* $(,)? }) => {
        impl $crate::Mapped for $ty {
            const SHAPE: $crate::Shape = $crate::Shape::Record;

            fn encode(
                &self,
                enc: &mut $crate::Encoder<'_>,
                path: &str,
            ) -> $crate::Result<()> {
                $( enc.field(path, $tag, &self.$field)?; )*
                let _ = (enc, path);
                Ok(())
            }

            fn decode(
                &mut self,
                dec: &mut $crate::Decoder<'_>,
                node: ::std::option::Option<$crate::NodeId>,
                path: &str,
            ) -> $crate::Result<()> {
                let node = dec.directory(node, path)?;
                $( dec.field(node, path, $tag, &mut self.$field)?; )*
                let _ = node;
                Ok(())
            }

            fn bind_children(&self, index: &mut $crate::FieldIndex, path: &str) {
                $( index.bind_field(path, $tag, &self.$field); )*
                let _ = (index, path);
            }

            fn locate(&self, segments: &[&str]) -> ::std::option::Option<&dyn ::std::any::Any> {
                match segments.split_first() {
                    None => Some(self),
                    $(
                        Some((head, rest)) if $crate::tag_matches($tag, head) => {
                            $crate::Mapped::locate(&self.$field, rest)
                        }
                    )*
                    Some(_) => None,
                }
            }

            fn locate_mut(
                &mut self,
                segments: &[&str],
            ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                match segments.split_first() {
                    None => Some(self),
                    $(
                        Some((head, rest)) if $crate::tag_matches($tag, head) => {
                            $crate::Mapped::locate_mut(&mut self.$field, rest)
                        }
                    )*
                    Some(_) => None,
                }
            }
        }
    };
}
