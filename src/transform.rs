// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Transformations over the IR.  Each transformation is a module with a `run`
// entry point that mutates the module in place; callers are expected to
// validate the module afterwards in debug builds.

pub mod legalize_entry_points;
