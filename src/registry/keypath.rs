//! Decoding of `###`-delimited store keys.
//!
//! The store has no schema of its own: every key is a flat string whose
//! segments encode a path into the mod manager's state tree. Classification
//! is data-driven. [`TEMPLATES`] lists the key shapes we understand, each as
//! a sequence of literal, wildcard and capture segments, and
//! [`classify`] turns a matching [`KeyPath`] into a typed [`StoreKey`].

use std::fmt;

use tracing::trace;

/// Segment delimiter used by the mod manager.
pub const DELIMITER: &str = "###";

/// A decoded store key: the delimiter-split segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Decode a raw key. Returns `None` for keys that are not UTF-8, which
    /// the store uses for its own binary control records.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(raw).ok()?;
        Some(Self::from_str_key(text))
    }

    pub fn from_str_key(text: &str) -> Self {
        Self {
            segments: text.split(DELIMITER).map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segment 0 (`settings`, `persistent`, ...).
    pub fn namespace(&self) -> &str {
        self.segments.first().map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(DELIMITER))
    }
}

/// Named positions a template can capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Game,
    ProfileId,
    ModId,
    /// A mod's top-level scalar field name.
    Field,
    /// An attribute name under `attributes`.
    Attr,
}

/// One segment of a key template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seg {
    /// Must equal this literal.
    Lit(&'static str),
    /// Matches any single segment without capturing it.
    Any,
    /// Matches any single segment and records it.
    Cap(Capture),
    /// Matches one of the listed literals and records it.
    OneOf(Capture, &'static [&'static str]),
}

/// What a matched key describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    ActiveProfile,
    GamePath,
    StagingPath,
    ProfileName,
    ProfileGame,
    ModField,
    ModAttribute,
    ModEnabled,
    ModEnabledTime,
}

/// A key shape with the segment positions of its named fields.
#[derive(Debug, Clone, Copy)]
pub struct KeyTemplate {
    pub kind: KeyKind,
    pub pattern: &'static [Seg],
    /// When false, extra trailing segments are allowed (and handed to the
    /// consumer as a nested path).
    pub exact: bool,
}

/// Mod fields stored directly under the mod's key.
pub const MOD_FIELDS: &[&str] = &["installationPath", "type", "state"];

use Capture::{Attr, Field, Game, ModId, ProfileId};
use Seg::{Any, Cap, Lit, OneOf};

/// Every key shape the registry understands.
///
/// The enabled indicators appear in two layouts: the one the mod manager
/// writes under `persistent###profiles`, and a namespace-first layout with
/// `modState` as the second segment.
pub const TEMPLATES: &[KeyTemplate] = &[
    KeyTemplate {
        kind: KeyKind::ActiveProfile,
        pattern: &[Lit("settings"), Lit("profiles"), Lit("lastActiveProfile"), Cap(Game)],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::GamePath,
        pattern: &[
            Lit("settings"),
            Lit("gameMode"),
            Lit("discovered"),
            Cap(Game),
            Lit("path"),
        ],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::StagingPath,
        pattern: &[Lit("settings"), Lit("mods"), Lit("installPath"), Cap(Game)],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ProfileName,
        pattern: &[Lit("persistent"), Lit("profiles"), Cap(ProfileId), Lit("name")],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ProfileGame,
        pattern: &[Lit("persistent"), Lit("profiles"), Cap(ProfileId), Lit("gameId")],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ModField,
        pattern: &[
            Lit("persistent"),
            Lit("mods"),
            Cap(Game),
            Cap(ModId),
            OneOf(Field, MOD_FIELDS),
        ],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ModAttribute,
        pattern: &[
            Lit("persistent"),
            Lit("mods"),
            Cap(Game),
            Cap(ModId),
            Lit("attributes"),
            Cap(Attr),
        ],
        exact: false,
    },
    KeyTemplate {
        kind: KeyKind::ModEnabled,
        pattern: &[
            Lit("persistent"),
            Lit("profiles"),
            Cap(ProfileId),
            Lit("modState"),
            Cap(ModId),
            Lit("enabled"),
        ],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ModEnabledTime,
        pattern: &[
            Lit("persistent"),
            Lit("profiles"),
            Cap(ProfileId),
            Lit("modState"),
            Cap(ModId),
            Lit("enabledTime"),
        ],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ModEnabled,
        pattern: &[
            Any,
            Lit("modState"),
            Cap(ProfileId),
            Lit("mods"),
            Cap(ModId),
            Lit("enabled"),
        ],
        exact: true,
    },
    KeyTemplate {
        kind: KeyKind::ModEnabledTime,
        pattern: &[
            Any,
            Lit("modState"),
            Cap(ProfileId),
            Lit("mods"),
            Cap(ModId),
            Lit("enabledTime"),
        ],
        exact: true,
    },
];

/// Fields captured from a matched key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFields<'a> {
    pub game: Option<&'a str>,
    pub profile_id: Option<&'a str>,
    pub mod_id: Option<&'a str>,
    pub field: Option<&'a str>,
    pub attr: Option<&'a str>,
    /// Segments past the end of a non-exact template.
    pub rest: &'a [String],
}

impl<'a> KeyFields<'a> {
    fn set(&mut self, capture: Capture, value: &'a str) {
        let slot = match capture {
            Game => &mut self.game,
            ProfileId => &mut self.profile_id,
            ModId => &mut self.mod_id,
            Field => &mut self.field,
            Attr => &mut self.attr,
        };
        *slot = Some(value);
    }

    fn get(&self, capture: Capture) -> Option<&'a str> {
        match capture {
            Game => self.game,
            ProfileId => self.profile_id,
            ModId => self.mod_id,
            Field => self.field,
            Attr => self.attr,
        }
    }
}

impl KeyTemplate {
    /// Match `path` against this template. Paths shorter than the pattern
    /// never match.
    pub fn capture<'a>(&self, path: &'a KeyPath) -> Option<KeyFields<'a>> {
        let segments = path.segments();
        if segments.len() < self.pattern.len() || (self.exact && segments.len() != self.pattern.len())
        {
            return None;
        }

        let mut fields = KeyFields::default();
        for (seg, actual) in self.pattern.iter().zip(segments) {
            match *seg {
                Lit(expected) if expected == actual => {}
                Lit(_) => return None,
                Any => {}
                Cap(capture) => fields.set(capture, actual),
                OneOf(capture, allowed) => {
                    if !allowed.contains(&actual.as_str()) {
                        return None;
                    }
                    fields.set(capture, actual);
                }
            }
        }
        fields.rest = &segments[self.pattern.len()..];
        Some(fields)
    }

    /// Build the key this template would match for `fields`.
    ///
    /// Wildcard positions are filled with `wildcard`. Returns `None` when a
    /// captured field is missing or a `OneOf` value is not allowed.
    pub fn render(&self, fields: &KeyFields<'_>, wildcard: &str) -> Option<String> {
        let mut parts: Vec<&str> = Vec::with_capacity(self.pattern.len() + fields.rest.len());
        for seg in self.pattern {
            match *seg {
                Lit(lit) => parts.push(lit),
                Any => parts.push(wildcard),
                Cap(capture) => parts.push(fields.get(capture)?),
                OneOf(capture, allowed) => {
                    let value = fields.get(capture)?;
                    if !allowed.contains(&value) {
                        return None;
                    }
                    parts.push(value);
                }
            }
        }
        if !self.exact {
            parts.extend(fields.rest.iter().map(String::as_str));
        }
        Some(parts.join(DELIMITER))
    }
}

/// A classified key with its extracted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKey<'a> {
    ActiveProfile { game: &'a str },
    GamePath { game: &'a str },
    StagingPath { game: &'a str },
    ProfileName { profile_id: &'a str },
    ProfileGame { profile_id: &'a str },
    ModField { game: &'a str, mod_id: &'a str, field: &'a str },
    ModAttribute {
        game: &'a str,
        mod_id: &'a str,
        attr: &'a str,
        nested: &'a [String],
    },
    ModEnabled { profile_id: &'a str, mod_id: &'a str },
    ModEnabledTime { profile_id: &'a str, mod_id: &'a str },
}

impl<'a> StoreKey<'a> {
    fn from_fields(kind: KeyKind, f: &KeyFields<'a>) -> Option<Self> {
        Some(match kind {
            KeyKind::ActiveProfile => Self::ActiveProfile { game: f.game? },
            KeyKind::GamePath => Self::GamePath { game: f.game? },
            KeyKind::StagingPath => Self::StagingPath { game: f.game? },
            KeyKind::ProfileName => Self::ProfileName {
                profile_id: f.profile_id?,
            },
            KeyKind::ProfileGame => Self::ProfileGame {
                profile_id: f.profile_id?,
            },
            KeyKind::ModField => Self::ModField {
                game: f.game?,
                mod_id: f.mod_id?,
                field: f.field?,
            },
            KeyKind::ModAttribute => Self::ModAttribute {
                game: f.game?,
                mod_id: f.mod_id?,
                attr: f.attr?,
                nested: f.rest,
            },
            KeyKind::ModEnabled => Self::ModEnabled {
                profile_id: f.profile_id?,
                mod_id: f.mod_id?,
            },
            KeyKind::ModEnabledTime => Self::ModEnabledTime {
                profile_id: f.profile_id?,
                mod_id: f.mod_id?,
            },
        })
    }
}

/// Classify a key against [`TEMPLATES`]; the first matching template wins.
pub fn classify(path: &KeyPath) -> Option<StoreKey<'_>> {
    let found = TEMPLATES
        .iter()
        .find_map(|t| t.capture(path).map(|fields| (t.kind, fields)));

    match found {
        Some((kind, fields)) => StoreKey::from_fields(kind, &fields),
        None => {
            trace!(namespace = path.namespace(), "Key matches no template");
            None
        }
    }
}
