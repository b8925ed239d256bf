use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// One downloadable or contactable deliverable granted to a buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Map-name fragments recognized by the filename normalization, with the
/// canonical file each resolves to. Matching is by substring over the
/// normalized (lowercase, hyphenated) name, so "Bermuda Remix" and
/// "Purgatório" both land on their canonical packs.
const KNOWN_MAP_FILES: &[(&str, &str)] = &[
    ("bermuda", "BERMUDA.zip"),
    ("kalahari", "KALAHARI.zip"),
    ("alpine", "ALPINE.zip"),
    ("purgat", "PURGATORIO.zip"),
];

/// Legacy product-id-keyed fulfillment rules for orders that predate the
/// catalog. Consulted only when the catalog lookup comes back empty.
const LEGACY_PRODUCT_RULES: &[(&str, LegacyRule)] = &[
    ("pacote-mapas-completo", LegacyRule::MapPack),
    (
        "guia-sensibilidade",
        LegacyRule::StaticFile("guia-sensibilidade.pdf"),
    ),
];

#[derive(Debug, Clone, Copy)]
enum LegacyRule {
    /// One deliverable per selected map, same normalization as the catalog path
    MapPack,
    /// A single fixed file under /downloads
    StaticFile(&'static str),
}

/// File name for the generic fallback deliverable when nothing more
/// specific is known about the purchase.
const DEFAULT_MATERIAL_FILE: &str = "material-xtreino.zip";

/// Normalizes a map display name to its pack file name: lowercase,
/// whitespace to hyphens, then substring match against the known
/// fragments; unrecognized names get a generated `imagens-<slug>.zip`.
pub fn normalize_map_filename(map_name: &str) -> String {
    let normalized = slugify(map_name);
    for (fragment, file) in KNOWN_MAP_FILES {
        if normalized.contains(fragment) {
            return (*file).to_string();
        }
    }
    format!("imagens-{}.zip", normalized)
}

fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn download_url(site_base_url: &str, file: &str) -> String {
    format!("{}/downloads/{}", site_base_url.trim_end_matches('/'), file)
}

fn absolutize(site_base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!(
            "{}/{}",
            site_base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

/// Minimal percent-encoding for the WhatsApp pre-filled message.
fn encode_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            ' ' => out.push_str("%20"),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => out.push(c),
            other => {
                let mut buf = [0u8; 4];
                for byte in other.encode_utf8(&mut buf).as_bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    out
}

fn selected_maps(options: Option<&serde_json::Value>) -> Vec<String> {
    options
        .and_then(|o| o.get("maps"))
        .and_then(|m| m.as_array())
        .map(|maps| {
            maps.iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn map_deliverables(
    maps: &[String],
    site_base_url: &str,
) -> Vec<Deliverable> {
    maps.iter()
        .map(|map| Deliverable {
            name: map.clone(),
            url: download_url(site_base_url, &normalize_map_filename(map)),
            description: Some(format!("Pacote de imagens do mapa {}", map)),
        })
        .collect()
}

fn contact_deliverable(
    product_name: &str,
    whatsapp_number: Option<&str>,
    default_number: &str,
) -> Deliverable {
    let number = whatsapp_number.unwrap_or(default_number);
    let message = format!(
        "Olá! Comprei o produto {} no XTreino e quero combinar a entrega.",
        product_name
    );
    Deliverable {
        name: "Atendimento via WhatsApp".to_string(),
        url: format!("https://wa.me/{}?text={}", number, encode_message(&message)),
        description: Some(product_name.to_string()),
    }
}

fn default_deliverable(site_base_url: &str) -> Deliverable {
    Deliverable {
        name: "Material de treino XTreino".to_string(),
        url: download_url(site_base_url, DEFAULT_MATERIAL_FILE),
        description: None,
    }
}

/// Pure deliverable generation. Deterministic and restartable: calling it
/// twice with the same inputs yields identical output.
pub fn generate_deliverables(
    product: Option<&product::Model>,
    product_id: Option<&str>,
    options: Option<&serde_json::Value>,
    site_base_url: &str,
    default_whatsapp: &str,
) -> Vec<Deliverable> {
    if let Some(product) = product {
        return match product.kind.as_str() {
            "download" => {
                let maps = selected_maps(options);
                if !maps.is_empty() {
                    map_deliverables(&maps, site_base_url)
                } else if let Some(url) = product.download_url.as_deref() {
                    vec![Deliverable {
                        name: product.name.clone(),
                        url: absolutize(site_base_url, url),
                        description: None,
                    }]
                } else {
                    vec![Deliverable {
                        name: product.name.clone(),
                        url: download_url(
                            site_base_url,
                            &format!("{}.zip", slugify(&product.name)),
                        ),
                        description: None,
                    }]
                }
            }
            "delivery" | "gift" => vec![contact_deliverable(
                &product.name,
                product.whatsapp_number.as_deref(),
                default_whatsapp,
            )],
            _ => vec![default_deliverable(site_base_url)],
        };
    }

    // No catalog entry: legacy product-id rules, then the generic default.
    if let Some(product_id) = product_id {
        for (legacy_id, rule) in LEGACY_PRODUCT_RULES {
            if *legacy_id == product_id {
                return match rule {
                    LegacyRule::MapPack => {
                        let maps = selected_maps(options);
                        if maps.is_empty() {
                            vec![default_deliverable(site_base_url)]
                        } else {
                            map_deliverables(&maps, site_base_url)
                        }
                    }
                    LegacyRule::StaticFile(file) => vec![Deliverable {
                        name: "Material de treino XTreino".to_string(),
                        url: download_url(site_base_url, file),
                        description: None,
                    }],
                };
            }
        }
    }

    vec![default_deliverable(site_base_url)]
}

/// Resolves the catalog entry for an order and generates its deliverables.
#[derive(Clone)]
pub struct FulfillmentService {
    db: Arc<DbPool>,
    site_base_url: String,
    default_whatsapp: String,
}

impl FulfillmentService {
    pub fn new(db: Arc<DbPool>, site_base_url: String) -> Self {
        Self {
            db,
            site_base_url,
            default_whatsapp: "5511999999999".to_string(),
        }
    }

    #[instrument(skip(self, options))]
    pub async fn generate(
        &self,
        product_id: Option<&str>,
        options: Option<&serde_json::Value>,
    ) -> Result<Vec<Deliverable>, ServiceError> {
        let product = match product_id {
            Some(id) => ProductEntity::find_by_id(id.to_string())
                .one(&*self.db)
                .await?,
            None => None,
        };

        Ok(generate_deliverables(
            product.as_ref(),
            product_id,
            options,
            &self.site_base_url,
            &self.default_whatsapp,
        ))
    }
}
