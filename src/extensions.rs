// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Tracks which GLSL extensions and which minimum language version the
// generated code will need.  Transformations record requirements here as
// they discover them; the code generator turns the result into `#version`
// and `#extension` lines.

// GLSL language versions, ordered so that requirements can be merged by
// taking the maximum.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum ProfileVersion {
    Glsl110,
    Glsl120,
    Glsl130,
    Glsl140,
    Glsl150,
    Glsl330,
    Glsl400,
    Glsl410,
    Glsl420,
    Glsl430,
    Glsl440,
    Glsl450,
    Glsl460,
}

#[cfg_attr(debug_assertions, derive(Debug))]
pub struct ExtensionTracker {
    // Extension names in the order they were first required.
    extensions: Vec<&'static str>,
    version: ProfileVersion,
}

impl ExtensionTracker {
    pub fn new() -> ExtensionTracker {
        ExtensionTracker { extensions: Vec::new(), version: ProfileVersion::Glsl110 }
    }

    pub fn require_glsl_extension(&mut self, name: &'static str) {
        if !self.extensions.contains(&name) {
            self.extensions.push(name);
        }
    }

    pub fn require_glsl_version(&mut self, version: ProfileVersion) {
        self.version = self.version.max(version);
    }

    pub fn glsl_extensions(&self) -> &[&'static str] {
        &self.extensions
    }

    pub fn requires_glsl_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|&extension| extension == name)
    }

    pub fn glsl_version(&self) -> ProfileVersion {
        self.version
    }
}

impl Default for ExtensionTracker {
    fn default() -> ExtensionTracker {
        ExtensionTracker::new()
    }
}
