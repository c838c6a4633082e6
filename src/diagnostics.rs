// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// User-facing diagnostics.  Transformations report problems in the shader
// here and carry on where they can; internal invariant violations panic
// instead, they are not diagnostics.

use thiserror::Error;

// A position in the shader source, as a byte offset recorded by the
// front-end.  The driver maps offsets back to file/line when printing.
#[derive(Copy, Clone, Eq, PartialEq)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct SourceLoc {
    pub raw: u32,
}

impl SourceLoc {
    pub const UNKNOWN: SourceLoc = SourceLoc { raw: 0 };

    pub fn new(raw: u32) -> SourceLoc {
        SourceLoc { raw }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DiagnosticKind {
    #[error("unknown system-value semantic '{0}'")]
    UnknownSystemValueSemantic(String),
}

#[derive(Clone, PartialEq)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Diagnostic {
    pub loc: SourceLoc,
    pub kind: DiagnosticKind,
}

// Collects diagnostics in the order they are produced.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> DiagnosticSink {
        DiagnosticSink { diagnostics: Vec::new() }
    }

    pub fn diagnose(&mut self, loc: SourceLoc, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic { loc, kind });
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl Default for DiagnosticSink {
    fn default() -> DiagnosticSink {
        DiagnosticSink::new()
    }
}
