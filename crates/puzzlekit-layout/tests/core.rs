#[path = "core/common.rs"]
mod common;
#[path = "core/pieces.rs"]
mod pieces;
#[path = "core/positioning.rs"]
mod positioning;
#[path = "core/undo.rs"]
mod undo;
#[path = "core/zorder.rs"]
mod zorder;
