//! Ball elements in the game area
//!
//! Each live ball is one absolutely-positioned `<div>` carrying its tier
//! emoji; the renderer owns the id → element map and keeps it in sync with
//! the event stream drained from the core each frame.

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

use crate::consts::TIER_COUNT;
use crate::sim::GameEvent;
use crate::tier_radius;

/// Display identity per tier, smallest to largest (tier 8 is the tiger)
pub const TIER_EMOJI: [&str; TIER_COUNT] = ["🍵", "🥥", "👑", "🥚", "🪿", "🐑", "🧑", "🐻", "🐅"];

/// CSS class carrying a tier's colors
pub fn tier_class(tier: u8) -> String {
    format!("item-{tier}")
}

/// Owns the DOM nodes for every live ball
pub struct DomRenderer {
    document: Document,
    area: HtmlElement,
    nodes: HashMap<u32, HtmlElement>,
    /// When false, the merge pop animation class is skipped (reduced motion)
    animate: bool,
}

impl DomRenderer {
    pub fn new(document: Document, area: HtmlElement, animate: bool) -> Self {
        Self {
            document,
            area,
            nodes: HashMap::new(),
            animate,
        }
    }

    /// Bring the DOM in line with one frame's worth of core events
    pub fn apply(&mut self, events: &[GameEvent]) -> Result<(), JsValue> {
        for event in events {
            match event {
                GameEvent::BallSpawned { id, tier, pos } => {
                    self.insert_node(*id, *tier, *pos, false)?;
                }
                GameEvent::BallMoved { id, pos } => {
                    if let Some(node) = self.nodes.get(id) {
                        place(node, tier_radius_of(node), *pos)?;
                    }
                }
                GameEvent::BallRemoved { id } => {
                    if let Some(node) = self.nodes.remove(id) {
                        node.remove();
                    }
                }
                GameEvent::BallsMerged { id, tier, pos, .. } => {
                    self.insert_node(*id, *tier, *pos, self.animate)?;
                }
                // The driver shows the win overlay
                GameEvent::GameWon { .. } => {}
            }
        }
        Ok(())
    }

    /// Drop every ball element (game reset)
    pub fn clear(&mut self) {
        for (_, node) in self.nodes.drain() {
            node.remove();
        }
    }

    /// Style the drop-preview element for the queued tier at position `x`
    pub fn style_preview(&self, preview: &HtmlElement, tier: u8, x: f32) -> Result<(), JsValue> {
        let r = tier_radius(tier);
        preview.set_text_content(Some(TIER_EMOJI[tier as usize]));
        preview.set_class_name(&format!("preview-ball {}", tier_class(tier)));
        let style = preview.style();
        style.set_property("width", &format!("{}px", r * 2.0))?;
        style.set_property("height", &format!("{}px", r * 2.0))?;
        style.set_property("font-size", &format!("{r}px"))?;
        style.set_property("line-height", &format!("{}px", r * 2.0))?;
        style.set_property("margin-left", &format!("{}px", -r))?;
        style.set_property("left", &format!("{x}px"))?;
        Ok(())
    }

    fn insert_node(&mut self, id: u32, tier: u8, pos: Vec2, pop: bool) -> Result<(), JsValue> {
        let node: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        let mut class = format!("game-ball {}", tier_class(tier));
        if pop {
            class.push_str(" merge-pop");
        }
        node.set_class_name(&class);
        node.set_text_content(Some(TIER_EMOJI[tier as usize]));
        node.set_attribute("data-tier", &tier.to_string())?;

        let r = tier_radius(tier);
        let style = node.style();
        style.set_property("width", &format!("{}px", r * 2.0))?;
        style.set_property("height", &format!("{}px", r * 2.0))?;
        style.set_property("font-size", &format!("{r}px"))?;
        style.set_property("line-height", &format!("{}px", r * 2.0))?;
        place(&node, r, pos)?;

        self.area.append_child(&node)?;
        if let Some(old) = self.nodes.insert(id, node) {
            // Shouldn't happen; ids are unique per run
            old.remove();
        }
        Ok(())
    }
}

fn place(node: &HtmlElement, radius: f32, pos: Vec2) -> Result<(), JsValue> {
    let style = node.style();
    style.set_property("left", &format!("{}px", pos.x - radius))?;
    style.set_property("top", &format!("{}px", pos.y - radius))?;
    Ok(())
}

fn tier_radius_of(node: &HtmlElement) -> f32 {
    node.get_attribute("data-tier")
        .and_then(|t| t.parse::<u8>().ok())
        .map(tier_radius)
        .unwrap_or(crate::consts::BALL_BASE_RADIUS)
}
