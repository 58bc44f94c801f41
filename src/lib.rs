//! # ML Tic-Tac-Toe
//!
//! Tabular Q-learning for two tic-tac-toe variants: the classic 3x3 board
//! and a 4x4 board with wildcard cells that count toward both players' win
//! lines. Agents learn a move policy online via TD(0) over a small feature
//! vector, with epsilon-greedy exploration and a JSON-persisted Q-table.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, symbols, wildcard-aware win detection
//! - [`ai`] — Feature extraction, action catalog, Q-table, agents
//! - [`training`] — Episode orchestration, self-play trainer, learning metrics
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
