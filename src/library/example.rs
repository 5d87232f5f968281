//! Default example library
//!
//! Seeded into the global `libraries/` folder so bot authors have a
//! working reference for requiring shared libraries from their actions.

/// Content of the seeded `example.js`
pub const EXAMPLE_JS: &str = r#"// Shared libraries example
//
// Any package installed in your bot's libraries can be required from
// actions and hooks. Install one, then require it by name:
//
//   const _ = require('lodash')
//
// This file is a library itself: require it with
//
//   const example = require('example')

const value = 17

const hello = name => `Hello ${name}!`

module.exports = { value, hello }
"#;
