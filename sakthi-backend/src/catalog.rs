//! Catalog: the fixed products, blog posts and export markets shown on the public site.
//!
//! Built once at startup and never mutated; every accessor hands back the full collection.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub specifications: BTreeMap<String, String>,
    pub image_url: String,
    pub suitable_crops: Vec<String>,
    pub packing_sizes: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub category: String,
    pub image_url: String,
    pub is_published: bool,
    pub published_at: String,
    pub author_id: String,
    pub meta_title: String,
    pub meta_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMarket {
    pub id: String,
    pub country: String,
    pub country_code: String,
    pub description: String,
    pub product_count: u32,
    pub shipment_frequency: String,
    pub is_active: bool,
    pub flag_icon: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    blog_posts: Vec<BlogPost>,
    export_markets: Vec<ExportMarket>,
}

impl Catalog {
    pub fn new(
        products: Vec<Product>,
        blog_posts: Vec<BlogPost>,
        export_markets: Vec<ExportMarket>,
    ) -> Self {
        Self {
            products,
            blog_posts,
            export_markets,
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_products(), seed_blog_posts(), seed_export_markets())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn blog_posts(&self) -> &[BlogPost] {
        &self.blog_posts
    }

    pub fn export_markets(&self) -> &[ExportMarket] {
        &self.export_markets
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn blog_post(&self, slug: &str) -> Option<&BlogPost> {
        self.blog_posts.iter().find(|p| p.slug == slug)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn specs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

struct ProductSeed<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    description: &'a str,
    specifications: &'a [(&'a str, &'a str)],
    image_url: &'a str,
    suitable_crops: &'a [&'a str],
    packing_sizes: &'a [&'a str],
}

impl ProductSeed<'_> {
    fn build(self) -> Product {
        Product {
            id: self.id.to_string(),
            name: self.name.to_string(),
            category: self.category.to_string(),
            description: self.description.to_string(),
            specifications: specs(self.specifications),
            image_url: self.image_url.to_string(),
            suitable_crops: strings(self.suitable_crops),
            packing_sizes: strings(self.packing_sizes),
            is_active: true,
        }
    }
}

fn seed_products() -> Vec<Product> {
    vec![
        ProductSeed {
            id: "prod-1",
            name: "Bactowin",
            category: "plant-growth-promotor",
            description: "Advanced plant growth promoter with beneficial microorganisms",
            specifications: &[
                ("Formulation", "Liquid Concentrate"),
                ("Active Ingredients", "Beneficial Bacteria & Fungi"),
                ("Application Rate", "2-3 ml/L water"),
                ("Shelf Life", "2 years"),
            ],
            image_url: "/Bactowin.jpeg",
            suitable_crops: &["Rice", "Wheat", "Cotton", "Vegetables"],
            packing_sizes: &["100ml", "250ml", "500ml", "1L"],
        }
        .build(),
        ProductSeed {
            id: "prod-2",
            name: "Cito Max",
            category: "bactericide-fungicide",
            description: "Broad spectrum bactericide and fungicide for crop protection",
            specifications: &[
                ("Formulation", "WP (Wettable Powder)"),
                ("Active Ingredients", "Copper Oxychloride"),
                ("Application Rate", "2-3 g/L water"),
                ("Shelf Life", "3 years"),
            ],
            image_url: "/Cito max.jpeg",
            suitable_crops: &["Tomato", "Chilli", "Grapes", "Mango"],
            packing_sizes: &["100g", "250g", "500g", "1kg"],
        }
        .build(),
        ProductSeed {
            id: "prod-3",
            name: "Excl Power",
            category: "micronutrients",
            description: "Complete micronutrient fertilizer for optimal plant growth",
            specifications: &[
                ("Formulation", "Granules"),
                ("NPK Content", "20-20-20 + TE"),
                ("Micronutrients", "Zn, Fe, Mn, B, Cu, Mo"),
                ("Application Rate", "50-100 kg/acre"),
            ],
            image_url: "/Excl Power.jpeg",
            suitable_crops: &["All Crops"],
            packing_sizes: &["5kg", "10kg", "25kg", "50kg"],
        }
        .build(),
        ProductSeed {
            id: "prod-4",
            name: "Humic Pow",
            category: "liquid-fertilizer",
            description: "Organic humic acid based liquid fertilizer",
            specifications: &[
                ("Formulation", "Liquid"),
                ("Humic Acid", "12%"),
                ("Fulvic Acid", "3%"),
                ("Application Rate", "2-3 ml/L water"),
            ],
            image_url: "/Humic Pow.jpeg",
            suitable_crops: &["All Crops"],
            packing_sizes: &["500ml", "1L", "5L", "10L"],
        }
        .build(),
        ProductSeed {
            id: "prod-5",
            name: "K-Max",
            category: "liquid-fertilizer",
            description: "Potassium rich liquid fertilizer for fruit development",
            specifications: &[
                ("Formulation", "Liquid"),
                ("Potassium (K2O)", "50%"),
                ("Application Rate", "1-2 ml/L water"),
            ],
            image_url: "/K- Max.jpeg",
            suitable_crops: &["Fruits", "Vegetables", "Flowers"],
            packing_sizes: &["500ml", "1L", "5L"],
        }
        .build(),
        ProductSeed {
            id: "prod-6",
            name: "Micro Max 2",
            category: "micronutrients",
            description: "Advanced micronutrient blend with chelated minerals",
            specifications: &[
                ("Formulation", "Granules"),
                ("Micronutrients", "EDTA Chelated Zn, Fe, Mn, Cu"),
                ("Application Rate", "5-10 kg/acre"),
            ],
            image_url: "/Micro Max 2.jpeg",
            suitable_crops: &["Cereals", "Pulses", "Oilseeds"],
            packing_sizes: &["5kg", "10kg", "25kg"],
        }
        .build(),
        ProductSeed {
            id: "prod-7",
            name: "Win-choke",
            category: "pesticides",
            description: "Effective weed control for broadleaf weeds",
            specifications: &[
                ("Formulation", "EC (Emulsifiable Concentrate)"),
                ("Active Ingredients", "Selective Herbicide"),
                ("Application Rate", "1-2 ml/L water"),
            ],
            image_url: "/Win-choke.jpeg",
            suitable_crops: &["Rice", "Wheat", "Soybean"],
            packing_sizes: &["100ml", "250ml", "500ml", "1L"],
        }
        .build(),
    ]
}

#[allow(clippy::too_many_arguments)]
fn blog_post(
    id: &str,
    title: &str,
    slug: &str,
    content: &str,
    excerpt: &str,
    category: &str,
    image_url: &str,
    published_at: &str,
    meta: (&str, &str),
) -> BlogPost {
    BlogPost {
        id: id.to_string(),
        title: title.to_string(),
        slug: slug.to_string(),
        content: content.to_string(),
        excerpt: excerpt.to_string(),
        category: category.to_string(),
        image_url: image_url.to_string(),
        is_published: true,
        published_at: published_at.to_string(),
        author_id: String::from("admin-1"),
        meta_title: meta.0.to_string(),
        meta_description: meta.1.to_string(),
    }
}

fn seed_blog_posts() -> Vec<BlogPost> {
    vec![
        blog_post(
            "blog-1",
            "Modern Agricultural Practices for Sustainable Farming",
            "modern-agricultural-practices",
            "In today's rapidly evolving agricultural landscape, sustainable farming practices have become more important than ever...",
            "Discover how modern agricultural practices are revolutionizing sustainable farming for better yields and environmental protection.",
            "Sustainable Farming",
            "/cotton-farming.png",
            "2024-12-01",
            (
                "Modern Agricultural Practices | Sakthi Sai BioTech",
                "Learn about sustainable farming practices and modern agricultural techniques for better crop yields.",
            ),
        ),
        blog_post(
            "blog-2",
            "The Role of Micronutrients in Crop Nutrition",
            "micronutrients-crop-nutrition",
            "Micronutrients play a crucial role in plant development and overall crop health...",
            "Understanding the importance of micronutrients for optimal crop growth and yield improvement.",
            "Crop Nutrition",
            "/micronutrients.png",
            "2024-11-28",
            (
                "Micronutrients in Crop Nutrition | Sakthi Sai BioTech",
                "Essential guide to micronutrients and their role in modern crop nutrition and plant health.",
            ),
        ),
        blog_post(
            "blog-3",
            "Integrated Pest Management Best Practices",
            "integrated-pest-management",
            "Integrated Pest Management (IPM) is an ecosystem-based strategy that focuses on long-term prevention...",
            "Comprehensive guide to implementing integrated pest management for sustainable agriculture.",
            "Pest Management",
            "/cotton-farming-generated.png",
            "2024-11-25",
            (
                "Integrated Pest Management | Sakthi Sai BioTech",
                "Best practices for integrated pest management in modern agriculture and farming.",
            ),
        ),
    ]
}

fn export_market(
    id: &str,
    country: &str,
    country_code: &str,
    description: &str,
    product_count: u32,
    shipment_frequency: &str,
    flag_icon: &str,
) -> ExportMarket {
    ExportMarket {
        id: id.to_string(),
        country: country.to_string(),
        country_code: country_code.to_string(),
        description: description.to_string(),
        product_count,
        shipment_frequency: shipment_frequency.to_string(),
        is_active: true,
        flag_icon: flag_icon.to_string(),
    }
}

fn seed_export_markets() -> Vec<ExportMarket> {
    vec![
        export_market(
            "market-1",
            "United States",
            "US",
            "Major market for agricultural inputs with strong demand for quality products",
            15,
            "Weekly",
            "\u{1F1FA}\u{1F1F8}",
        ),
        export_market(
            "market-2",
            "Brazil",
            "BR",
            "Leading agricultural market with extensive farming operations",
            12,
            "Bi-weekly",
            "\u{1F1E7}\u{1F1F7}",
        ),
        export_market(
            "market-3",
            "India",
            "IN",
            "Large agricultural sector with growing demand for advanced inputs",
            18,
            "Weekly",
            "\u{1F1EE}\u{1F1F3}",
        ),
        export_market(
            "market-4",
            "Australia",
            "AU",
            "Advanced agricultural market with focus on sustainable farming",
            10,
            "Monthly",
            "\u{1F1E6}\u{1F1FA}",
        ),
        export_market(
            "market-5",
            "Kenya",
            "KE",
            "Growing agricultural market in East Africa region",
            8,
            "Bi-weekly",
            "\u{1F1F0}\u{1F1EA}",
        ),
        export_market(
            "market-6",
            "Netherlands",
            "NL",
            "European hub for agricultural distribution and innovation",
            14,
            "Weekly",
            "\u{1F1F3}\u{1F1F1}",
        ),
    ]
}
