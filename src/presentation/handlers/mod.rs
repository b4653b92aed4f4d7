// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod change_handler;
pub mod scan_handler;
pub mod settings_handler;
pub mod target_handler;
