//! Decoder for index-coded dialogue state predictions.
//!
//! Sequence-to-sequence DST models trained on schema-guided dialogue emit
//! one compact string per (turn, service): slot names, categorical values,
//! and intents are replaced by short index tokens whose assignment is
//! randomized per turn. This crate turns those strings back into structured
//! dialogue states and writes them into blank SGD-format dialogue files.
//!
//! # Modules
//!
//! - [`payload`]: model-family framing, isolating the decodable payload
//!   between `<BOS>` / `<EOS>` markers
//! - [`segment`]: the `[states]` / `[intents]` / `[req_slots]` section split
//! - [`fragment`]: index-marker tokenization of the states section
//! - [`decode`]: resolving fragments into slot values, intent, and requested
//!   slots, re-merging free-text values against the dialogue context
//! - [`context`]: the running dialogue context used to ground free-text
//!   values
//! - [`assemble`]: the per-dialogue driver that walks template turns and
//!   fills every frame state
//! - [`template`]: serde models for template, prediction, and reference
//!   files
//! - [`diagnostics`] and [`error`]: recoverable findings versus failures
//!   that abort a dialogue
//!
//! # Quick Start
//!
//! ```
//! use turnstile_dst::context::DialogueContext;
//! use turnstile_dst::decode::decode_state;
//! use turnstile_dst::types::TurnMappings;
//!
//! let mut mappings = TurnMappings::default();
//! mappings
//!     .slot_mapping
//!     .insert("0".to_string(), "price_range".to_string());
//!
//! let mut context = DialogueContext::new();
//! context.push_utterance("i want a cheap restaurant");
//!
//! let (state, diagnostics) =
//!     decode_state("[states] 0:cheap [intents] [req_slots]", &mappings, &context);
//!
//! assert_eq!(state.slot_values["price_range"], vec!["cheap"]);
//! assert_eq!(state.active_intent, "NONE");
//! assert!(diagnostics.is_empty());
//! ```

pub mod assemble;
pub mod context;
pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod fragment;
pub mod payload;
pub mod segment;
pub mod template;
pub mod types;
