use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::new_id;
use super::validation::{
    decode_field, immutable_field, parse_patches, unknown_field, Required, ValidationError,
};

pub const COLLECTION: &str = "products";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Urls {
    pub regular: String,
    pub small: String,
    pub thumb: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    pub html: String,
}

/// Author of the product photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUser {
    pub id: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_description: Option<String>,
    /// Popularity counter, also used as the unit price when pricing orders.
    pub likes: f64,
    pub urls: Urls,
    pub links: Links,
    pub user: ProductUser,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlsDraft {
    pub regular: Option<String>,
    pub small: Option<String>,
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinksDraft {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUserDraft {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub portfolio_url: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagDraft {
    pub title: Option<String>,
}

/// Acknowledgement of a delete; `deleted_count` is 0 when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub acknowledged: bool,
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// Unvalidated product payload as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub description: Option<String>,
    pub alt_description: Option<String>,
    pub likes: Option<f64>,
    pub urls: Option<UrlsDraft>,
    pub links: Option<LinksDraft>,
    pub user: Option<ProductUserDraft>,
    pub tags: Option<Vec<TagDraft>>,
}

impl UrlsDraft {
    fn require(self, req: &mut Required) -> Urls {
        Urls {
            regular: req.text(self.regular, "urls.regular"),
            small: req.text(self.small, "urls.small"),
            thumb: req.text(self.thumb, "urls.thumb"),
        }
    }
}

impl LinksDraft {
    fn require(self, req: &mut Required) -> Links {
        Links {
            self_link: req.text(self.self_link, "links.self"),
            html: req.text(self.html, "links.html"),
        }
    }
}

impl ProductUserDraft {
    fn require(self, req: &mut Required) -> ProductUser {
        ProductUser {
            id: req.text(self.id, "user.id"),
            first_name: req.text(self.first_name, "user.first_name"),
            last_name: self.last_name,
            portfolio_url: self.portfolio_url,
            username: req.text(self.username, "user.username"),
        }
    }
}

fn require_tags(tags: Vec<TagDraft>, req: &mut Required) -> Vec<Tag> {
    tags.into_iter()
        .enumerate()
        .map(|(i, tag)| Tag {
            title: req.text(tag.title, &format!("tags[{i}].title")),
        })
        .collect()
}

impl ProductDraft {
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(ValidationError::malformed)
    }

    /// Checks every required field and builds the record, generating an id when none was given.
    pub fn validate(self) -> Result<Product, ValidationError> {
        let mut req = Required::default();
        let likes = req.number(self.likes, "likes");
        let urls = self.urls.unwrap_or_default().require(&mut req);
        let links = self.links.unwrap_or_default().require(&mut req);
        let user = self.user.unwrap_or_default().require(&mut req);
        let tags = require_tags(self.tags.unwrap_or_default(), &mut req);
        let id = self.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id);
        req.finish(Product {
            id,
            description: self.description,
            alt_description: self.alt_description,
            likes,
            urls,
            links,
            user,
            tags,
        })
    }
}

/// One allowed change to a stored product. Sub-records are replaced whole.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductPatch {
    Description(Option<String>),
    AltDescription(Option<String>),
    Likes(f64),
    Urls(Urls),
    Links(Links),
    User(ProductUser),
    Tags(Vec<Tag>),
}

impl ProductPatch {
    /// Parses a caller's change object; unknown keys and `id` are rejected.
    pub fn parse_change(change: &Map<String, Value>) -> Result<Vec<Self>, ValidationError> {
        parse_patches(change, Self::parse_field)
    }

    fn parse_field(key: &str, value: &Value) -> Result<Self, ValidationError> {
        let mut req = Required::default();
        let patch = match key {
            "description" => Self::Description(decode_field(key, value)?),
            "alt_description" => Self::AltDescription(decode_field(key, value)?),
            "likes" => Self::Likes(decode_field(key, value)?),
            "urls" => Self::Urls(decode_field::<UrlsDraft>(key, value)?.require(&mut req)),
            "links" => Self::Links(decode_field::<LinksDraft>(key, value)?.require(&mut req)),
            "user" => Self::User(decode_field::<ProductUserDraft>(key, value)?.require(&mut req)),
            "tags" => Self::Tags(require_tags(decode_field(key, value)?, &mut req)),
            "id" | "_id" => return Err(immutable_field(key)),
            _ => return Err(unknown_field(key)),
        };
        req.finish(patch)
    }
}

impl Product {
    pub fn apply(&mut self, patches: impl IntoIterator<Item = ProductPatch>) {
        for patch in patches {
            match patch {
                ProductPatch::Description(v) => self.description = v,
                ProductPatch::AltDescription(v) => self.alt_description = v,
                ProductPatch::Likes(v) => self.likes = v,
                ProductPatch::Urls(v) => self.urls = v,
                ProductPatch::Links(v) => self.links = v,
                ProductPatch::User(v) => self.user = v,
                ProductPatch::Tags(v) => self.tags = v,
            }
        }
    }

    pub fn has_tag(&self, title: &str) -> bool {
        self.tags.iter().any(|t| t.title == title)
    }
}
