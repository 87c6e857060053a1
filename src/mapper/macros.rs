//! Macros for declaring converter tables

/// Register typed converters for one backend and one raw shape.
///
/// Each entry names the target media type and a function
/// `fn(&ClientContext, &Raw) -> Result<T, ConversionError>` where `T` converts
/// into `MediaContent`. Raw items of any other shape are rejected with
/// `ConversionError::UnexpectedRawKind`.
///
/// # Examples
///
/// ```ignore
/// register_converters! {
///     registry, ClientType::Plex, RawItem::Plex => RawKind::PlexMetadata {
///         Movie => convert::movie,
///         Series => convert::series,
///     }
/// }
/// ```
#[macro_export]
macro_rules! register_converters {
    (
        $registry:expr, $client_type:expr, $raw_variant:path => $raw_kind:path {
            $($target:ident => $convert:path),* $(,)?
        }
    ) => {
        $(
            $registry.register(
                $crate::mapper::ConverterKey::new(
                    $client_type,
                    $raw_kind,
                    $crate::models::MediaType::$target,
                ),
                |ctx, raw| match raw {
                    $raw_variant(item) => {
                        $convert(ctx, item).map($crate::models::MediaContent::from)
                    }
                    #[allow(unreachable_patterns)]
                    other => Err($crate::utils::errors::ConversionError::UnexpectedRawKind {
                        expected: $raw_kind,
                        actual: other.kind(),
                    }),
                },
            );
        )*
    };
}
