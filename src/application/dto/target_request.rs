// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::{parse_page_list, Target};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 创建监控目标请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateTargetDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1), custom(function = "validate_pages"))]
    pub pages: Vec<String>,
}

impl CreateTargetDto {
    /// 转换为领域实体，页面URL去除首尾空白
    pub fn into_target(self) -> Target {
        let pages: Vec<String> = self.pages.iter().map(|p| p.trim().to_string()).collect();
        Target::new(self.name.trim().to_string(), self.url.trim().to_string(), &pages)
    }
}

fn validate_pages(pages: &[String]) -> Result<(), ValidationError> {
    let trimmed: Vec<&str> = pages.iter().map(|p| p.trim()).collect();
    let raw = serde_json::to_string(&trimmed).map_err(|_| ValidationError::new("pages"))?;

    parse_page_list(&raw).map(|_| ()).map_err(|e| {
        let mut error = ValidationError::new("pages");
        error.message = Some(e.to_string().into());
        error
    })
}
