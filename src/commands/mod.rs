// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod amortization;
pub mod assets;
pub mod config;
pub mod defaults;
pub mod doctor;
pub mod forms;
pub mod importer;
pub mod journal;
pub mod properties;
pub mod reports;
