use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dom::dom_model::{EventKind, Key, NodeId, SharedDocument};

/// Delays for the two deferred key events sent to autocomplete widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeConfig {
    #[serde(default = "default_arrow_down_delay_ms")]
    pub arrow_down_delay_ms: u64,
    #[serde(default = "default_enter_delay_ms")]
    pub enter_delay_ms: u64,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            arrow_down_delay_ms: default_arrow_down_delay_ms(),
            enter_delay_ms: default_enter_delay_ms(),
        }
    }
}

fn default_arrow_down_delay_ms() -> u64 { 100 }
fn default_enter_delay_ms() -> u64 { 200 }

/// Schedule ArrowDown then Enter at `node`, each on its own timer.
///
/// Fire-and-forget: nothing joins these tasks and the fill result is already
/// decided. A key is dropped if the document was replaced or the node is
/// gone by the time its timer fires.
pub fn schedule_autocomplete_nudge(
    doc: &SharedDocument,
    node: NodeId,
    generation: u64,
    config: &NudgeConfig,
) {
    let keys = [
        (Key::ArrowDown, config.arrow_down_delay_ms),
        (Key::Enter, config.enter_delay_ms),
    ];

    for (key, delay_ms) in keys {
        let doc = SharedDocument::clone(doc);
        let delay = Duration::from_millis(delay_ms);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    send_key(&doc, node, generation, key);
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    send_key(&doc, node, generation, key);
                });
            }
        }
    }
}

fn send_key(doc: &SharedDocument, node: NodeId, generation: u64, key: Key) {
    let mut doc = match doc.lock() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Warning: document lock poisoned, dropping {:?} nudge: {}", key, e);
            return;
        }
    };

    if doc.generation() != generation || doc.element(node).is_none() {
        return;
    }
    let _ = doc.dispatch(node, EventKind::KeyDown { key });
}
