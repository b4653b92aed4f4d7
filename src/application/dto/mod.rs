// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义请求体及其校验规则，以及组合了多个领域对象的响应体
pub mod scan_request;
pub mod target_request;
pub mod target_response;
