//! Immutable per-client request profile: option sets, tone, locale and
//! the location hint block sent with every turn.

use serde::Serialize;
use tracing::info;

use chathub_config::ConversationStyle;

use crate::ClientConfig;

/// Option sets enabled for every style.
pub const BASE_OPTION_SETS: &[&str] = &[
    "fluxcopilot",
    "nojbf",
    "iyxapbing",
    "iycapbing",
    "dgencontentv3",
    "nointernalsugg",
    "disable_telemetry",
    "machine_affinity",
    "streamf",
    "codeint",
    "langdtwb",
    "fdwtlst",
    "fluxprod",
    "eredirecturl",
    "gptvnodesc",
    "gptvnoex",
];

/// Message types the client accepts back from the service.
pub const ALLOWED_MESSAGE_TYPES: &[&str] = &[
    "ActionRequest",
    "Chat",
    "Context",
    "InternalSearchQuery",
    "InternalSearchResult",
    "InternalLoaderMessage",
    "Progress",
    "GenerateContentQuery",
    "SearchQuery",
    "GeneratedCode",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationHint {
    pub source_type: u32,
    pub region_type: u32,
    pub center: LatLng,
    pub radius: u32,
    pub name: String,
    pub accuracy: u32,
    #[serde(rename = "FDConfidence")]
    pub fd_confidence: f64,
    pub country_name: String,
    pub country_confidence: u32,
    pub admin1_name: String,
    pub populated_place_name: String,
    pub populated_place_confidence: u32,
    pub post_code_name: String,
    pub utc_offset: i32,
    pub dma: u32,
}

impl Default for LocationHint {
    fn default() -> Self {
        Self {
            source_type: 1,
            region_type: 2,
            center: LatLng {
                latitude: 33.975_700_378_417_97,
                longitude: -118.256_401_062_011_72,
            },
            radius: 24902,
            name: "Los Angeles, California".into(),
            accuracy: 24902,
            fd_confidence: 0.5,
            country_name: "United States".into(),
            country_confidence: 8,
            admin1_name: "California".into(),
            populated_place_name: "Los Angeles".into(),
            populated_place_confidence: 5,
            post_code_name: "90060".into(),
            utc_offset: -8,
            dma: 803,
        }
    }
}

impl LocationHint {
    /// `lat:..;long:..;re=1000m;` form used in the message block.
    pub fn location_string(&self) -> String {
        format!(
            "lat:{:.6};long:{:.6};re=1000m;",
            self.center.latitude, self.center.longitude
        )
    }
}

/// The fixed, versioned flag bag for a client. Built once and shared by
/// reference with every turn-request builder.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestProfile {
    pub option_sets: Vec<String>,
    /// Tone label sent on the wire.
    pub tone: String,
    pub gpt_id: String,
    pub locale: String,
    pub location_hint: LocationHint,
}

impl RequestProfile {
    /// Derive the profile for `style` from the client configuration.
    pub fn new(config: &ClientConfig, style: ConversationStyle) -> Self {
        let mut option_sets: Vec<String> =
            BASE_OPTION_SETS.iter().map(|s| s.to_string()).collect();
        let mut gpt_id = "copilot";

        let tone = match style {
            ConversationStyle::Balanced => {
                option_sets.extend(["galileo".to_string(), "gldcl1p".to_string()]);
                "Balanced"
            }
            ConversationStyle::Precise => {
                option_sets.push("h3precise".into());
                "Precise"
            }
            ConversationStyle::Creative if config.use_classic => "CreativeClassic",
            ConversationStyle::Creative => "Creative",
            ConversationStyle::Designer => {
                option_sets.push("ai_persona_designer_gpt".into());
                gpt_id = "designer";
                "Creative"
            }
        };

        if config.no_search {
            option_sets.push("nosearchall".into());
        }
        if config.gpt4_turbo && !config.use_classic {
            option_sets.push("gpt4tmncnp".into());
        }
        if !config.option_sets_override.is_empty() {
            option_sets = config.option_sets_override.clone();
        }

        info!(options = ?option_sets, tone = %tone, "Final conversation options");

        Self {
            option_sets,
            tone: tone.to_string(),
            gpt_id: gpt_id.to_string(),
            locale: config.locale.clone(),
            location_hint: LocationHint::default(),
        }
    }
}
