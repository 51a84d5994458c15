//! Transport-agnostic response cards.
//!
//! A card is an ordered list of visual sections plus rows of clickable
//! actions. It is built fresh per request and handed to a channel for
//! rendering; the only mutation after construction is the image augmenter
//! attaching an image reference to a section by index.

use std::path::PathBuf;

/// A structured response: sections, action rows, and a plain-text fallback.
#[derive(Debug, Clone, Default)]
pub struct Card {
    pub sections: Vec<Section>,
    /// Rows of clickable actions, rendered below the sections.
    pub action_rows: Vec<Vec<Action>>,
    /// Plain-text fallback for transports without rich rendering.
    pub fallback_text: String,
    /// Optional branding footer line.
    pub footer: Option<String>,
}

impl Card {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self {
            fallback_text: fallback_text.into(),
            ..Default::default()
        }
    }

    /// Attach an image to the section at `index`.
    ///
    /// Returns false (and leaves the card untouched) when the index is out
    /// of range. This is the only permitted post-construction mutation.
    pub fn attach_image(&mut self, index: usize, image: ImageRef) -> bool {
        match self.sections.get_mut(index) {
            Some(section) => {
                section.image = Some(image);
                true
            }
            None => false,
        }
    }
}

/// One visual block within a card.
#[derive(Debug, Clone)]
pub struct Section {
    /// Hex color tag (e.g. "#5AC8FA").
    pub color: &'static str,
    pub title: String,
    pub body: String,
    pub fields: Vec<Field>,
    pub image: Option<ImageRef>,
}

impl Section {
    pub fn new(color: &'static str, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            color,
            title: title.into(),
            body: body.into(),
            fields: Vec::new(),
            image: None,
        }
    }

    /// Builder-style field append.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// A named value displayed inside a section.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Reference to a generated image file attached to a section.
#[derive(Debug, Clone)]
pub struct ImageRef {
    pub filename: String,
    pub path: PathBuf,
}

/// A clickable affordance on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub style: ActionStyle,
}

/// Visual style of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}
