//! CLI commands

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::json;
use shopfront_http::SessionClient;
use shopfront_http::types::{
    LoginRequest, OrderItem, OrderQuery, OrderRequest, OrderStatus, ProductInput, ProductQuery,
    PurchaseQuery, PurchaseRequest, SignupRequest, UpdateUserRequest, UserQuery,
};
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and start a session
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        name: Option<String>,
    },

    /// Log in and persist the session token
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Log out and forget the local session
    Logout,

    /// Show the current user's profile
    Whoami,

    /// Update the current user's profile
    UpdateMe {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        password: Option<String>,
    },

    /// Delete the current account
    DeleteAccount {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// User administration
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Product catalog
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Purchases
    Purchases {
        #[command(subcommand)]
        command: PurchaseCommands,
    },

    /// Orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Show the locally stored session
    Session,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        role: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a user
    Get { id: String },
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products
    List {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long)]
        sort: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a product
    Get { id: String },

    /// Create a product
    Create {
        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Update a product
    Update {
        id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Delete a product
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum PurchaseCommands {
    /// List purchases
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a purchase
    Get { id: String },

    /// Buy a product
    Create {
        #[arg(long)]
        product_id: String,

        #[arg(long, default_value = "1")]
        quantity: u32,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List orders
    List {
        #[arg(long)]
        status: Option<OrderStatus>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show an order
    Get { id: String },

    /// Place an order
    Create {
        /// Line item as PRODUCT_ID:QUANTITY (repeatable)
        #[arg(long = "item", required = true, value_parser = parse_item)]
        items: Vec<OrderItem>,

        #[arg(long)]
        shipping_address: Option<String>,
    },

    /// Change an order's status
    Status { id: String, status: OrderStatus },

    /// Cancel an order
    Cancel { id: String },
}

#[derive(Args)]
pub struct PageArgs {
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    price: Option<f64>,

    #[arg(long)]
    stock: Option<i64>,

    #[arg(long)]
    category: Option<String>,
}

impl From<ProductArgs> for ProductInput {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            stock: args.stock,
            category: args.category,
        }
    }
}

fn parse_item(s: &str) -> Result<OrderItem, String> {
    let (product_id, quantity) = match s.split_once(':') {
        Some((id, qty)) => (id, qty.parse::<u32>().map_err(|e| format!("{qty}: {e}"))?),
        None => (s, 1),
    };
    if product_id.is_empty() {
        return Err("product id must not be empty".to_string());
    }
    Ok(OrderItem {
        product_id: product_id.to_string(),
        quantity,
        price: None,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Commands {
    pub async fn execute(self, client: &SessionClient) -> Result<()> {
        match self {
            Self::Signup {
                email,
                password,
                name,
            } => {
                let response = client
                    .signup(&SignupRequest {
                        email,
                        password,
                        name,
                    })
                    .await?;
                print_json(&response)
            }
            Self::Login { email, password } => {
                let response = client.login(&LoginRequest { email, password }).await?;
                if response.token.is_none() {
                    bail!("Server accepted the login but returned no token");
                }
                print_json(&response)
            }
            Self::Logout => {
                let body = client.logout().await?;
                info!("Logged out");
                print_json(&body)
            }
            Self::Whoami => print_json(&client.get_me().await?),
            Self::UpdateMe {
                name,
                email,
                password,
            } => {
                let user = client
                    .update_me(&UpdateUserRequest {
                        name,
                        email,
                        password,
                    })
                    .await?;
                print_json(&user)
            }
            Self::DeleteAccount { yes } => {
                if !yes {
                    bail!("Refusing to delete the account without --yes");
                }
                print_json(&client.delete_account().await?)
            }
            Self::Users { command } => command.execute(client).await,
            Self::Products { command } => command.execute(client).await,
            Self::Purchases { command } => command.execute(client).await,
            Self::Orders { command } => command.execute(client).await,
            Self::Session => {
                let session = client.session();
                print_json(&json!({
                    "base_url": client.base_url(),
                    "authenticated": session.is_authenticated(),
                    "expired": session.is_expired(),
                    "expiry": session.expiry(),
                    "user": session.cached_user(),
                }))
            }
        }
    }
}

impl UserCommands {
    pub async fn execute(self, client: &SessionClient) -> Result<()> {
        match self {
            Self::List { search, role, page } => {
                let users = client
                    .list_users(&UserQuery {
                        search,
                        role,
                        page: page.page,
                        limit: page.limit,
                    })
                    .await?;
                print_json(&users)
            }
            Self::Get { id } => print_json(&client.get_user(&id).await?),
        }
    }
}

impl ProductCommands {
    pub async fn execute(self, client: &SessionClient) -> Result<()> {
        match self {
            Self::List {
                search,
                category,
                min_price,
                max_price,
                sort,
                page,
            } => {
                let products = client
                    .list_products(&ProductQuery {
                        search,
                        category,
                        min_price,
                        max_price,
                        sort,
                        page: page.page,
                        limit: page.limit,
                    })
                    .await?;
                print_json(&products)
            }
            Self::Get { id } => print_json(&client.get_product(&id).await?),
            Self::Create { fields } => {
                let input = ProductInput::from(fields);
                if input.name.is_none() || input.price.is_none() {
                    bail!("A new product needs --name and --price");
                }
                print_json(&client.create_product(&input).await?)
            }
            Self::Update { id, fields } => {
                print_json(&client.update_product(&id, &fields.into()).await?)
            }
            Self::Delete { id } => print_json(&client.delete_product(&id).await?),
        }
    }
}

impl PurchaseCommands {
    pub async fn execute(self, client: &SessionClient) -> Result<()> {
        match self {
            Self::List { page } => {
                let purchases = client
                    .list_purchases(&PurchaseQuery {
                        page: page.page,
                        limit: page.limit,
                    })
                    .await?;
                print_json(&purchases)
            }
            Self::Get { id } => print_json(&client.get_purchase(&id).await?),
            Self::Create {
                product_id,
                quantity,
            } => {
                let purchase = client
                    .create_purchase(&PurchaseRequest {
                        product_id,
                        quantity,
                    })
                    .await
                    .context("Purchase failed")?;
                print_json(&purchase)
            }
        }
    }
}

impl OrderCommands {
    pub async fn execute(self, client: &SessionClient) -> Result<()> {
        match self {
            Self::List { status, page } => {
                let orders = client
                    .list_orders(&OrderQuery {
                        status,
                        page: page.page,
                        limit: page.limit,
                    })
                    .await?;
                print_json(&orders)
            }
            Self::Get { id } => print_json(&client.get_order(&id).await?),
            Self::Create {
                items,
                shipping_address,
            } => {
                let order = client
                    .create_order(&OrderRequest {
                        items,
                        shipping_address,
                    })
                    .await?;
                print_json(&order)
            }
            Self::Status { id, status } => {
                print_json(&client.update_order_status(&id, status).await?)
            }
            Self::Cancel { id } => print_json(&client.cancel_order(&id).await?),
        }
    }
}
