use clap::{Args, Parser, Subcommand, ValueEnum};
use motoshop_store::model::{Customer, Motorcycle, ServiceOrder, ServiceStatus};
use motoshop_store::sdk::{self, Shop};
use motoshop_store::stats::{format_brl, RevenuePolicy};
use motoshop_store::validation::{mask_date, mask_phone, mask_plate, mask_tax_id};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, env = "MOTOSHOP_DATA_DIR", default_value = "data")]
    data_dir: String,

    /// Which orders count as revenue on the dashboard: all or completed.
    #[arg(long, env = "MOTOSHOP_REVENUE_POLICY", default_value = "all")]
    revenue_policy: RevenuePolicy,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum Kind {
    Customers,
    Motorcycles,
    Orders,
}

#[derive(Args, Clone)]
struct CustomerArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    tax_id: String,
    #[arg(long)]
    birth_date: String,
}

#[derive(Args, Clone)]
struct MotorcycleArgs {
    #[arg(long)]
    model: String,
    #[arg(long)]
    year: String,
    #[arg(long)]
    plate: String,
    #[arg(long)]
    color: String,
    #[arg(long)]
    chassis: String,
    #[arg(long)]
    notes: String,
}

#[derive(Args, Clone)]
struct OrderArgs {
    #[arg(long)]
    customer: String,
    #[arg(long)]
    plate: String,
    /// Filled in from the plate when a motorcycle with that plate is on file.
    #[arg(long, default_value = "")]
    model: String,
    #[arg(long)]
    mileage: String,
    #[arg(long)]
    date: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    status: ServiceStatus,
    #[arg(long)]
    amount: String,
}

#[derive(Subcommand, Clone)]
enum Commands {
    List { kind: Kind },
    Show { kind: Kind, position: usize },
    AddCustomer(CustomerArgs),
    EditCustomer {
        position: usize,
        #[command(flatten)]
        fields: CustomerArgs,
    },
    AddMotorcycle(MotorcycleArgs),
    EditMotorcycle {
        position: usize,
        #[command(flatten)]
        fields: MotorcycleArgs,
    },
    AddOrder(OrderArgs),
    EditOrder {
        position: usize,
        #[command(flatten)]
        fields: OrderArgs,
    },
    Delete { kind: Kind, position: usize },
    Suggest { kind: Kind, query: String },
    Stats,
}

impl From<CustomerArgs> for Customer {
    fn from(a: CustomerArgs) -> Self {
        Customer {
            name: a.name,
            email: a.email,
            phone: mask_phone(&a.phone),
            tax_id: mask_tax_id(&a.tax_id),
            birth_date: mask_date(&a.birth_date),
        }
    }
}

impl From<MotorcycleArgs> for Motorcycle {
    fn from(a: MotorcycleArgs) -> Self {
        Motorcycle {
            code: String::new(),
            model: a.model,
            year: a.year,
            plate: mask_plate(&a.plate),
            color: a.color,
            chassis: a.chassis,
            notes: a.notes,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn build_order(shop: &Shop, a: OrderArgs, editing: Option<usize>) -> anyhow::Result<ServiceOrder> {
    let mut form = match editing {
        Some(p) => shop.edit_order_form(p).await?,
        None => shop.order_form().await?,
    };
    form.input_customer(&a.customer);
    form.order.motorcycle_model = a.model;
    form.input_plate(&a.plate);
    let mut order = form.into_order();
    order.mileage = a.mileage;
    order.date = mask_date(&a.date);
    order.description = a.description;
    order.status = Some(a.status);
    order.amount = a.amount;
    Ok(order)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let store = sdk::open(&cli.data_dir).await?;
    let shop = Shop::new(store.clone());

    match cli.command {
        Commands::List { kind } => match kind {
            Kind::Customers => print_json(&shop.customers().records().await?)?,
            Kind::Motorcycles => print_json(&shop.motorcycles().records().await?)?,
            Kind::Orders => print_json(&shop.orders().records().await?)?,
        },
        Commands::Show { kind, position } => match kind {
            Kind::Customers => print_json(&shop.customers().record_at(position).await?)?,
            Kind::Motorcycles => print_json(&shop.motorcycles().record_at(position).await?)?,
            Kind::Orders => print_json(&shop.orders().record_at(position).await?)?,
        },
        Commands::AddCustomer(fields) => {
            let id = shop.save_customer(fields.into(), None).await?;
            println!("OK {}", id);
        }
        Commands::EditCustomer { position, fields } => {
            let id = shop.save_customer(fields.into(), Some(position)).await?;
            println!("OK {}", id);
        }
        Commands::AddMotorcycle(fields) => {
            let id = shop.save_motorcycle(fields.into(), None).await?;
            println!("OK {}", id);
        }
        Commands::EditMotorcycle { position, fields } => {
            let id = shop.save_motorcycle(fields.into(), Some(position)).await?;
            println!("OK {}", id);
        }
        Commands::AddOrder(fields) => {
            let order = build_order(&shop, fields, None).await?;
            let id = shop.save_order(order, None).await?;
            println!("OK {}", id);
        }
        Commands::EditOrder { position, fields } => {
            let order = build_order(&shop, fields, Some(position)).await?;
            let id = shop.save_order(order, Some(position)).await?;
            println!("OK {}", id);
        }
        Commands::Delete { kind, position } => {
            match kind {
                Kind::Customers => drop(shop.delete_customer(position).await?),
                Kind::Motorcycles => drop(shop.delete_motorcycle(position).await?),
                Kind::Orders => drop(shop.delete_order(position).await?),
            }
            println!("OK");
        }
        Commands::Suggest { kind, query } => match kind {
            Kind::Customers => print_json(&shop.suggest_customers(&query).await?)?,
            Kind::Motorcycles => print_json(&shop.suggest_motorcycles(&query).await?)?,
            Kind::Orders => anyhow::bail!("suggestions are only available for customers and motorcycles"),
        },
        Commands::Stats => {
            let stats = shop.dashboard(cli.revenue_policy).await?;
            print_json(&stats)?;
            println!("Revenue: {}", format_brl(stats.total_revenue));
            println!("Average ticket: {}", format_brl(stats.average_ticket));
        }
    }

    store.wait().await;
    Ok(())
}
