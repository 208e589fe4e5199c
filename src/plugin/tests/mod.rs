//! Plugin Loading Tests
//!
//! Registry behaviour exercised through scripted loaders.
