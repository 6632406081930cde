//! Querystring Options
//!
//! Typed options for each API route, parsed from the raw querystring.
//!
//! Keys may repeat (`?name=a&name=b`) and may carry array suffixes
//! (`name[]=a`, `name[0]=a`) as produced by common browser and Node query
//! serializers. Empty values are dropped and unknown keys are ignored.

use thiserror::Error;

/// Largest page size Helix accepts for `first`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Largest number of values Helix accepts for a repeatable filter, or for
/// `id` plus `name` (games) and `id` plus `login` (users) together.
pub const MAX_VALUES_PER_KEY: usize = 100;

// =============================================================================
// Errors
// =============================================================================

/// Invalid querystring input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// `first` is not an integer within the Helix page size range.
    #[error("'first' must be an integer between 1 and 100, got '{0}'")]
    InvalidPageSize(String),

    /// An ID parameter is not an unsigned integer.
    #[error("'{key}' must be numeric, got '{value}'")]
    InvalidId {
        /// Parameter name.
        key: String,
        /// Offending value.
        value: String,
    },

    /// A flag parameter is not a recognised boolean.
    #[error("'{key}' must be true or false, got '{value}'")]
    InvalidFlag {
        /// Parameter name.
        key: String,
        /// Offending value.
        value: String,
    },

    /// A repeatable parameter was given too many times.
    #[error("'{key}' accepts at most {max} values")]
    TooManyValues {
        /// Parameter name.
        key: String,
        /// Maximum accepted.
        max: usize,
    },
}

// =============================================================================
// Raw Parameters
// =============================================================================

/// Decoded querystring key/value pairs in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode a raw (percent-encoded) querystring.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        Self::from_pairs(
            url::form_urlencoded::parse(raw.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned())),
        )
    }

    /// Build from already-decoded pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let pairs = pairs
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (normalize_key(&key).to_string(), value.trim().to_string()))
            .collect();

        Self { pairs }
    }

    /// All values for a key, in order.
    #[must_use]
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The last value given for a key.
    #[must_use]
    pub fn last(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether no parameters were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn strings(&self, key: &str) -> Result<Vec<String>, QueryError> {
        let values = self.all(key);
        check_count(key, values.len())?;
        Ok(values.into_iter().map(str::to_string).collect())
    }

    fn ids(&self, key: &str) -> Result<Vec<u64>, QueryError> {
        let values = self.all(key);
        check_count(key, values.len())?;
        values
            .into_iter()
            .map(|value| {
                value.parse::<u64>().map_err(|_| QueryError::InvalidId {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .collect()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, QueryError> {
        self.last(key)
            .map(|value| {
                parse_flag(value).ok_or_else(|| QueryError::InvalidFlag {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }
}

/// Strip `[]` / `[n]` array suffixes from a key.
fn normalize_key(key: &str) -> &str {
    match key.find('[') {
        Some(idx) if key.ends_with(']') => &key[..idx],
        _ => key,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn check_count(key: &str, count: usize) -> Result<(), QueryError> {
    if count > MAX_VALUES_PER_KEY {
        return Err(QueryError::TooManyValues {
            key: key.to_string(),
            max: MAX_VALUES_PER_KEY,
        });
    }
    Ok(())
}

// =============================================================================
// Typed Options
// =============================================================================

/// Helix cursor pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Page size (Helix default applies when absent).
    pub first: Option<u32>,
    /// Cursor to continue from.
    pub after: Option<String>,
}

impl Pagination {
    /// Parse `first` and `after`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPageSize` if `first` is out of range.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let first = params
            .last("first")
            .map(|value| {
                value
                    .parse::<u32>()
                    .ok()
                    .filter(|n| (1..=MAX_PAGE_SIZE).contains(n))
                    .ok_or_else(|| QueryError::InvalidPageSize(value.to_string()))
            })
            .transpose()?;

        Ok(Self {
            first,
            after: params.last("after").map(str::to_string),
        })
    }
}

/// Options for `/api/games/top`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopGamesQuery {
    /// Page of top games to fetch.
    pub page: Pagination,
    /// Explicit request to include (`true`) or skip (`false`) top games.
    pub include_top: Option<bool>,
}

impl TopGamesQuery {
    /// Parse from querystring parameters.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for an invalid page size or flag.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        Ok(Self {
            page: Pagination::from_params(params)?,
            include_top: params.flag("include_top")?,
        })
    }

    /// Whether the caller opted out of top games.
    #[must_use]
    pub const fn is_excluded(&self) -> bool {
        matches!(self.include_top, Some(false))
    }
}

/// Options for `/api/games/specific`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecificGamesQuery {
    /// Game IDs.
    pub ids: Vec<u64>,
    /// Exact game names.
    pub names: Vec<String>,
}

impl SpecificGamesQuery {
    /// Parse from querystring parameters.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for non-numeric IDs or too many values.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let ids = params.ids("id")?;
        let names = params.strings("name")?;
        check_count("id/name", ids.len() + names.len())?;
        Ok(Self { ids, names })
    }

    /// Whether no game was named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.names.is_empty()
    }
}

/// Options for `/api/games/combo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboQuery {
    /// Games the user selected.
    pub specific: SpecificGamesQuery,
    /// Top games to merge in.
    pub top: TopGamesQuery,
}

impl ComboQuery {
    /// Parse from querystring parameters.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if any component is invalid.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        Ok(Self {
            specific: SpecificGamesQuery::from_params(params)?,
            top: TopGamesQuery::from_params(params)?,
        })
    }

    /// Nothing selected and top games not explicitly requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specific.is_empty() && self.top.include_top != Some(true)
    }
}

/// Options for `/api/streams/games`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamsByGameQuery {
    /// Games to list streams for.
    pub game_ids: Vec<u64>,
    /// Broadcast languages to keep.
    pub languages: Vec<String>,
    /// Page of streams to fetch.
    pub page: Pagination,
}

impl StreamsByGameQuery {
    /// Parse from querystring parameters.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for invalid IDs, page size or too many values.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        Ok(Self {
            game_ids: params.ids("game_id")?,
            languages: params.strings("language")?,
            page: Pagination::from_params(params)?,
        })
    }
}

/// Options for `/api/streams/top`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopStreamsQuery {
    /// Broadcast languages to keep.
    pub languages: Vec<String>,
    /// Page of streams to fetch.
    pub page: Pagination,
}

impl TopStreamsQuery {
    /// Parse from querystring parameters.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for an invalid page size or too many languages.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        Ok(Self {
            languages: params.strings("language")?,
            page: Pagination::from_params(params)?,
        })
    }
}

/// Options for `/api/streams/details`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDetailsQuery {
    /// User IDs.
    pub ids: Vec<u64>,
    /// Login names.
    pub logins: Vec<String>,
}

impl UserDetailsQuery {
    /// Parse from querystring parameters.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for non-numeric IDs or too many values.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        let ids = params.ids("id")?;
        let logins = params.strings("login")?;
        check_count("id/login", ids.len() + logins.len())?;
        Ok(Self { ids, logins })
    }

    /// Whether no user was named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.logins.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
