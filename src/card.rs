//! Google Chat payload layouts.
//!
//! The builder produces a schema-neutral [`Message`]; [`Message::render`]
//! turns it into one of the two JSON layouts Google Chat webhooks accept.

use crate::config::CardSchema;
use serde::Serialize;

/// Card id used for the single card of a `cardsV2` message.
pub const CARD_ID: &str = "info-card-id";

/// Title of the collapsible details section.
pub const SECTION_HEADER: &str = "Details";

/// Google Chat built-in icon shown in front of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Icon {
    Bookmark,
    Ticket,
    Clock,
    Bus,
    ConfirmationNumberIcon,
    Description,
}

/// One line of the details section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub icon: Icon,
    pub text: String,
}

impl Widget {
    pub fn new(icon: Icon, text: impl Into<String>) -> Self {
        Widget { icon, text: text.into() }
    }
}

/// Layout-independent message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Plain text shown above the card, mention tags included.
    pub text: String,
    pub title: String,
    pub subtitle: String,
    pub widgets: Vec<Widget>,
    /// Leading widgets kept visible when the section is collapsed.
    pub uncollapsible: usize,
}

impl Message {
    pub fn render(self, schema: CardSchema) -> RenderedPayload {
        match schema {
            CardSchema::CardsV2 => RenderedPayload::CardsV2(self.into_cards_v2()),
            CardSchema::Legacy => RenderedPayload::Legacy(self.into_legacy()),
        }
    }

    fn into_cards_v2(self) -> CardsV2Payload {
        let widgets = self
            .widgets
            .into_iter()
            .map(|w| DecoratedTextWidget {
                decorated_text: DecoratedText {
                    start_icon: StartIcon { known_icon: w.icon },
                    text: w.text,
                },
            })
            .collect();

        CardsV2Payload {
            text: self.text,
            cards_v2: vec![CardV2Entry {
                card_id: CARD_ID.to_string(),
                card: CardV2 {
                    header: CardHeader {
                        title: self.title,
                        subtitle: self.subtitle,
                    },
                    sections: CardV2Section {
                        header: SECTION_HEADER.to_string(),
                        collapsible: true,
                        uncollapsible_widgets_count: self.uncollapsible,
                        widgets,
                    },
                },
            }],
        }
    }

    fn into_legacy(self) -> LegacyPayload {
        let widgets = self
            .widgets
            .into_iter()
            .map(|w| TextParagraphWidget {
                text_paragraph: TextParagraph { text: w.text },
            })
            .collect();

        LegacyPayload {
            text: self.text,
            cards: vec![LegacyCard {
                sections: vec![LegacySection { widgets }],
            }],
        }
    }
}

/// JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderedPayload {
    CardsV2(CardsV2Payload),
    Legacy(LegacyPayload),
}

impl RenderedPayload {
    /// The top-level `text` field.
    pub fn text(&self) -> &str {
        match self {
            RenderedPayload::CardsV2(p) => &p.text,
            RenderedPayload::Legacy(p) => &p.text,
        }
    }

    /// Widget texts in display order, whatever the layout.
    pub fn widget_texts(&self) -> Vec<&str> {
        match self {
            RenderedPayload::CardsV2(p) => p
                .cards_v2
                .iter()
                .flat_map(|c| c.card.sections.widgets.iter())
                .map(|w| w.decorated_text.text.as_str())
                .collect(),
            RenderedPayload::Legacy(p) => p
                .cards
                .iter()
                .flat_map(|c| c.sections.iter())
                .flat_map(|s| s.widgets.iter())
                .map(|w| w.text_paragraph.text.as_str())
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardsV2Payload {
    pub text: String,
    #[serde(rename = "cardsV2")]
    pub cards_v2: Vec<CardV2Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardV2Entry {
    pub card_id: String,
    pub card: CardV2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardV2 {
    pub header: CardHeader,
    pub sections: CardV2Section,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardHeader {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardV2Section {
    pub header: String,
    pub collapsible: bool,
    pub uncollapsible_widgets_count: usize,
    pub widgets: Vec<DecoratedTextWidget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedTextWidget {
    pub decorated_text: DecoratedText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedText {
    pub start_icon: StartIcon,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartIcon {
    pub known_icon: Icon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyPayload {
    pub text: String,
    pub cards: Vec<LegacyCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyCard {
    pub sections: Vec<LegacySection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacySection {
    pub widgets: Vec<TextParagraphWidget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextParagraphWidget {
    pub text_paragraph: TextParagraph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextParagraph {
    pub text: String,
}
