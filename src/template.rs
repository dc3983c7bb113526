//! Message templates for build notifications.
//!
//! A template is one line or a list of lines containing `%{name}`
//! placeholders. Each line is interpolated from a [`BuildInfo`]; names that
//! do not exist are left in place so typos stay visible in the channel.

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::config::defaults;

static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();

fn placeholder_pattern() -> Option<&'static Regex> {
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"%\{([a-z_]+)\}").ok())
        .as_ref()
}

/// Outcome of a build, as reported in notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    #[default]
    Passed,
    Fixed,
    Broken,
    Failed,
    StillFailing,
    Errored,
    Canceled,
    Pending,
}

impl BuildState {
    /// Short state name, used for `%{result}`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Fixed => "fixed",
            Self::Broken => "broken",
            Self::Failed => "failed",
            Self::StillFailing => "still failing",
            Self::Errored => "errored",
            Self::Canceled => "canceled",
            Self::Pending => "pending",
        }
    }

    /// Sentence used for `%{message}`.
    pub fn sentence(&self) -> &'static str {
        match self {
            Self::Passed => "The build passed.",
            Self::Fixed => "The build was fixed.",
            Self::Broken => "The build was broken.",
            Self::Failed => "The build failed.",
            Self::StillFailing => "The build is still failing.",
            Self::Errored => "The build has errored.",
            Self::Canceled => "The build was canceled.",
            Self::Pending => "The build is pending.",
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The build a notification is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildInfo {
    /// Repository slug, `owner/name`.
    pub repository: String,
    pub build_number: String,
    pub build_id: String,
    pub branch: String,
    /// Full commit SHA.
    pub commit: String,
    pub author: String,
    pub commit_message: String,
    pub compare_url: String,
    pub build_url: String,
    pub state: BuildState,
}

impl BuildInfo {
    /// Value for a placeholder name, or `None` if the name is unknown.
    pub fn placeholder(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "repository" | "repository_slug" => Cow::Borrowed(self.repository.as_str()),
            "repository_name" => Cow::Borrowed(
                self.repository
                    .rsplit_once('/')
                    .map_or(self.repository.as_str(), |(_, name)| name),
            ),
            "build_number" => Cow::Borrowed(self.build_number.as_str()),
            "build_id" => Cow::Borrowed(self.build_id.as_str()),
            "branch" => Cow::Borrowed(self.branch.as_str()),
            "commit" => Cow::Borrowed(short_sha(&self.commit)),
            "author" => Cow::Borrowed(self.author.as_str()),
            "commit_message" => Cow::Borrowed(self.commit_message.as_str()),
            "result" => Cow::Borrowed(self.state.as_str()),
            "message" => Cow::Borrowed(self.state.sentence()),
            "compare_url" => Cow::Borrowed(self.compare_url.as_str()),
            "build_url" => Cow::Borrowed(self.build_url.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(7) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// One template line or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Template {
    Line(String),
    Lines(Vec<String>),
}

impl Default for Template {
    fn default() -> Self {
        Template::Lines(defaults::default_template())
    }
}

impl Template {
    /// The raw template lines in order.
    pub fn lines(&self) -> &[String] {
        match self {
            Template::Line(line) => std::slice::from_ref(line),
            Template::Lines(lines) => lines,
        }
    }

    /// Interpolate every line against `build`.
    ///
    /// Lines containing embedded line breaks (`\n`, `\r\n` or a lone `\r`)
    /// become several message lines, and lines that render empty are dropped.
    pub fn render(&self, build: &BuildInfo) -> Vec<String> {
        self.lines()
            .iter()
            .map(|line| match placeholder_pattern() {
                Some(re) => interpolate(re, line, build),
                None => line.clone(),
            })
            .flat_map(|rendered| {
                rendered
                    .split(['\r', '\n'])
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

fn interpolate(pattern: &Regex, line: &str, build: &BuildInfo) -> String {
    pattern
        .replace_all(line, |caps: &Captures<'_>| match build.placeholder(&caps[1]) {
            Some(value) => value.into_owned(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
