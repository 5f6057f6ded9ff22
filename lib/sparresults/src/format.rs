use std::fmt;

/// The serialization of a SPARQL endpoint response, as told by its `Content-Type`.
///
/// Anything that is not one of the query results formats is kept as [`ResultFormat::Other`]
/// and handed to an [`RdfReader`](crate::RdfReader).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ResultFormat {
    /// [SPARQL Query Results JSON Format](https://www.w3.org/TR/sparql11-results-json/)
    Json,
    /// [SPARQL Query Results XML Format](https://www.w3.org/TR/rdf-sparql-XMLres/)
    Xml,
    /// [SPARQL Query Results CSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/)
    Csv,
    /// [SPARQL Query Results TSV Format](https://www.w3.org/TR/sparql11-results-csv-tsv/)
    Tsv,
    /// A bare `true` or `false` served as `text/boolean`.
    Boolean,
    /// Any other media type, lowercased and without parameters.
    ///
    /// It is empty if the response had no content type.
    Other(String),
}

impl ResultFormat {
    /// The format canonical media type.
    ///
    /// ```
    /// use sparresults::ResultFormat;
    ///
    /// assert_eq!(
    ///     ResultFormat::Json.media_type(),
    ///     "application/sparql-results+json"
    /// )
    /// ```
    #[inline]
    pub fn media_type(&self) -> &str {
        match self {
            Self::Json => "application/sparql-results+json",
            Self::Xml => "application/sparql-results+xml",
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
            Self::Boolean => "text/boolean",
            Self::Other(media_type) => media_type,
        }
    }

    /// Looks for a known format from a media type.
    ///
    /// Parameters like `charset` are ignored and the `x-` prefix of experimental subtypes is stripped.
    ///
    /// Example:
    /// ```
    /// use sparresults::ResultFormat;
    ///
    /// assert_eq!(
    ///     ResultFormat::from_media_type("application/sparql-results+json; charset=utf-8"),
    ///     ResultFormat::Json
    /// );
    /// assert_eq!(
    ///     ResultFormat::from_media_type("text/x-tab-separated-values"),
    ///     ResultFormat::Tsv
    /// );
    /// assert_eq!(
    ///     ResultFormat::from_media_type("Application/N-Triples"),
    ///     ResultFormat::Other("application/n-triples".into())
    /// );
    /// ```
    pub fn from_media_type(media_type: &str) -> Self {
        const MEDIA_SUBTYPES: [(&str, ResultFormat); 8] = [
            ("boolean", ResultFormat::Boolean),
            ("csv", ResultFormat::Csv),
            ("json", ResultFormat::Json),
            ("sparql-results+json", ResultFormat::Json),
            ("sparql-results+xml", ResultFormat::Xml),
            ("tab-separated-values", ResultFormat::Tsv),
            ("tsv", ResultFormat::Tsv),
            ("xml", ResultFormat::Xml),
        ];

        let essence = media_type
            .split_once(';')
            .map_or(media_type, |(essence, _)| essence)
            .trim();
        let Some((r#type, subtype)) = essence.split_once('/') else {
            return Self::Other(essence.to_ascii_lowercase());
        };
        let r#type = r#type.trim();
        if r#type.eq_ignore_ascii_case("application") || r#type.eq_ignore_ascii_case("text") {
            let subtype = subtype.trim();
            let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
            for (candidate_subtype, candidate_id) in MEDIA_SUBTYPES {
                if candidate_subtype.eq_ignore_ascii_case(subtype) {
                    return candidate_id;
                }
            }
        }
        Self::Other(essence.to_ascii_lowercase())
    }

    /// Same as [`from_media_type`](Self::from_media_type) but a missing content type gives `Other("")`.
    #[inline]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        content_type.map_or_else(|| Self::Other(String::new()), Self::from_media_type)
    }

    /// Is it one of the SPARQL query results formats (or a bare boolean)?
    #[inline]
    pub fn is_query_results(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for ResultFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "SPARQL Results in JSON",
            Self::Xml => "SPARQL Results in XML",
            Self::Csv => "SPARQL Results in CSV",
            Self::Tsv => "SPARQL Results in TSV",
            Self::Boolean => "boolean",
            Self::Other(media_type) => media_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_aliases() {
        for (media_type, format) in [
            ("application/json", ResultFormat::Json),
            ("application/xml", ResultFormat::Xml),
            ("text/xml", ResultFormat::Xml),
            ("application/sparql-results+xml;charset=UTF-8", ResultFormat::Xml),
            ("text/csv; header=present", ResultFormat::Csv),
            ("text/tab-separated-values", ResultFormat::Tsv),
            ("text/boolean", ResultFormat::Boolean),
            ("text/plain", ResultFormat::Other("text/plain".into())),
            ("image/json", ResultFormat::Other("image/json".into())),
            ("garbage", ResultFormat::Other("garbage".into())),
        ] {
            assert_eq!(ResultFormat::from_media_type(media_type), format, "{media_type}");
        }
    }

    #[test]
    fn missing_content_type() {
        assert_eq!(
            ResultFormat::from_content_type(None),
            ResultFormat::Other(String::new())
        );
        assert!(!ResultFormat::from_content_type(None).is_query_results());
    }
}
