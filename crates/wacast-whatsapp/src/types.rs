// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud API template-message request types.

use serde::Serialize;

/// Body of `POST /{version}/{phone_number_id}/messages` for a template send.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateRequest {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub template: TemplateBody,
}

impl TemplateRequest {
    /// Build the request. The header image component is only attached when
    /// a media link is present.
    pub fn new(to: &str, template_name: &str, language_code: &str, media: Option<&str>) -> Self {
        let components = media.map(|link| {
            vec![Component {
                component_type: "header",
                parameters: vec![Parameter {
                    parameter_type: "image",
                    image: ImageLink {
                        link: link.to_string(),
                    },
                }],
            }]
        });
        Self {
            messaging_product: "whatsapp",
            to: to.to_string(),
            message_type: "template",
            template: TemplateBody {
                name: template_name.to_string(),
                language: Language {
                    code: language_code.to_string(),
                },
                components,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateBody {
    pub name: String,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Component>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Language {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub component_type: &'static str,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub parameter_type: &'static str,
    pub image: ImageLink,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageLink {
    pub link: String,
}
