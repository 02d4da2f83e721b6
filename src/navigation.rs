//! Maps a viewer location to the dataset to show and computes where the
//! "next" and "change architecture" controls lead.
//!
//! A location carries two optional query parameters: `arch` names the dataset
//! family and `step` the increment within it. Every transition produces a new
//! location; following it starts a fresh session that parses it again.

use thiserror::Error;
use url::Url;

pub const DEFAULT_ARCHITECTURE: &str = "migration";
pub const DEFAULT_BASE: &str = "archgrow://viewer/";
pub const MAX_STEP: u32 = 9;
/// Architectures that only exist as a single, unstepped dataset.
pub const STEPLESS_ARCHITECTURES: &[&str] = &["lamp"];

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("invalid location `{location}`")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationState {
    base: Url,
    architecture: String,
    step: Option<u32>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            base: default_base(),
            architecture: DEFAULT_ARCHITECTURE.to_owned(),
            step: None,
        }
    }
}

fn default_base() -> Url {
    Url::parse(DEFAULT_BASE).expect("default base is a valid URL")
}

impl NavigationState {
    /// Parses either an absolute URL or a bare query such as
    /// `?arch=lamp&step=2`, which is resolved against [`DEFAULT_BASE`].
    pub fn from_location(location: &str) -> Result<Self, NavigationError> {
        let parsed = match Url::parse(location) {
            Err(url::ParseError::RelativeUrlWithoutBase) => default_base().join(location),
            other => other,
        };
        let url = parsed.map_err(|source| NavigationError::InvalidLocation {
            location: location.to_owned(),
            source,
        })?;

        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        let mut architecture = None;
        let mut step = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "arch" => architecture = Some(value.into_owned()),
                "step" => step = Some(value.into_owned()),
                _ => {}
            }
        }

        let architecture = architecture
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_owned());
        let step = step.as_deref().and_then(parse_step);

        let mut base = url.clone();
        base.set_query(None);
        base.set_fragment(None);

        Self {
            base,
            architecture,
            step,
        }
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn step(&self) -> Option<u32> {
        self.step
    }

    /// Location this state was parsed from, in canonical form.
    pub fn location(&self) -> Url {
        self.target(&self.architecture, self.step)
    }

    /// Dataset name: the architecture followed by the step, if any.
    pub fn resource_key(&self) -> String {
        match self.step {
            Some(step) => format!("{}{step}", self.architecture),
            None => self.architecture.clone(),
        }
    }

    /// Whether the "next" control applies to the current architecture.
    pub fn shows_advance(&self) -> bool {
        !STEPLESS_ARCHITECTURES.contains(&self.architecture.as_str())
    }

    pub fn next_step(&self) -> u32 {
        match self.step {
            Some(step) if step < MAX_STEP => step + 1,
            _ => 1,
        }
    }

    pub fn advance(&self) -> Url {
        self.target(&self.architecture, Some(self.next_step()))
    }

    /// Switching family always lands on its unstepped dataset.
    pub fn change_architecture(&self, architecture: &str) -> Url {
        self.target(architecture, None)
    }

    fn target(&self, architecture: &str, step: Option<u32>) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("arch", architecture);
            if let Some(step) = step {
                query.append_pair("step", &step.to_string());
            }
        }
        url
    }
}

fn parse_step(raw: &str) -> Option<u32> {
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(0) => None,
        Ok(step) => Some(step),
        Err(error) => {
            tracing::warn!(step = raw, %error, "ignoring unparsable step");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_steps_are_unset() {
        assert_eq!(parse_step(""), None);
        assert_eq!(parse_step("0"), None);
        assert_eq!(parse_step("two"), None);
        assert_eq!(parse_step("4"), Some(4));
    }

    #[test]
    fn base_drops_query_and_fragment() {
        let state =
            NavigationState::from_location("https://example.org/grow/index.html?arch=lamp#top")
                .unwrap();

        assert_eq!(
            state.change_architecture("migration").as_str(),
            "https://example.org/grow/index.html?arch=migration"
        );
    }
}
