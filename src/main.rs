use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shop_admin::api::{AdminApi, InMemoryApi, RestApi};
use shop_admin::config::AdminConfig;
use shop_admin::context::AdminContext;
use shop_admin::domain::order::{CustomerInfo, OrderDraft, OrderDraftCommand, PaymentMethod};
use shop_admin::domain::product::{ProductDraft, ProductDraftCommand, ProductInfo};
use shop_admin::domain::variants::LineInput;
use shop_admin::metrics::Metrics;
use shop_admin::models::{Category, Color, Money, Size};
use shop_admin::notify::TracingNotifier;
use shop_admin::picker::{CategoryPicker, ColorPicker, FetchOutcome, SizePicker};
use shop_admin::submission::SubmissionOrchestrator;
use shop_admin::wizard::Wizard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO, can be overridden with RUST_LOG
    // Example: RUST_LOG=shop_admin=trace cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shop_admin=debug"))
        )
        .init();

    let config = AdminConfig::from_env()?;
    tracing::info!(
        api_url = ?config.api_url,
        page_size = config.page_size,
        compensate = config.compensate_failed_orders,
        "Starting shop admin workflow demo"
    );

    // === 1. Backend ===
    let api: Arc<dyn AdminApi> = match &config.api_url {
        Some(url) => {
            tracing::info!(url = %url, "Using REST backend");
            Arc::new(RestApi::new(url.clone(), &config)?)
        }
        None => {
            tracing::info!("SHOP_ADMIN_API_URL not set, using seeded in-memory backend");
            Arc::new(seeded_backend())
        }
    };

    let metrics = Arc::new(Metrics::new()?);
    let ctx = AdminContext::new(api, Arc::new(TracingNotifier), metrics.clone(), config);
    let orchestrator = SubmissionOrchestrator::new(ctx.clone());

    // === 2. Order wizard ===
    let mut order = Wizard::new(OrderDraft::new(), &ctx);
    order.draft_mut()?.execute(OrderDraftCommand::SetCustomer(
        CustomerInfo::new("Jane Doe", "0900000000", "1 Main St").with_email("jane@example.com"),
    ))?;
    order.draft_mut()?.execute(OrderDraftCommand::SetPaymentMethod(PaymentMethod::BankTransfer))?;
    order.draft_mut()?.execute(OrderDraftCommand::SetShippingCost(Money::new(30)))?;
    order.next()?;

    let color = pick_color(&ctx, Vec::new()).await?;
    let used = order.draft().lines().sizes_used_with(&color.id);
    let size = pick_size(&ctx, used).await?;
    order.draft_mut()?.execute(OrderDraftCommand::SelectColor(color))?;
    order.draft_mut()?.execute(OrderDraftCommand::SelectSize(size))?;
    order
        .draft_mut()?
        .execute(OrderDraftCommand::AddSelected { quantity: 2, unit_price: Money::new(150) })?;

    let color = pick_color(&ctx, Vec::new()).await?;
    let size = pick_size(&ctx, order.draft().lines().sizes_used_with(&color.id)).await?;
    order
        .draft_mut()?
        .execute(OrderDraftCommand::AddLine(LineInput::new(color, size, 1, Money::new(150))))?;
    tracing::info!(
        subtotal = %order.draft().subtotal(),
        total = %order.draft().total(),
        "Order draft ready for preview"
    );
    order.next()?;

    let route = order.submit(&orchestrator).await?;
    tracing::info!(route = ?route, "Order wizard finished");

    // === 3. Product wizard ===
    let category = pick_category(&ctx).await?;
    let mut product = Wizard::new(ProductDraft::new(), &ctx);
    product.draft_mut()?.execute(ProductDraftCommand::SetInfo(
        ProductInfo::new("Basic Tee", Money::new(200))
            .with_description("Cotton crew neck")
            .with_sale_price(Money::new(180))
            .with_category(category),
    ))?;
    product.next()?;

    let color = pick_color(&ctx, Vec::new()).await?;
    for size_index in 0..2 {
        let used = product.draft().variants().sizes_used_with(&color.id);
        let mut sizes = SizePicker::new(ctx.page_size());
        sizes.open_and_load(&ctx, used).await?;
        let Some(row) = (0..sizes.rows().len()).find(|&i| !sizes.is_excluded(&sizes.rows()[i])) else {
            break;
        };
        let size = sizes.pick(row).context("size row vanished")?;
        product.draft_mut()?.execute(ProductDraftCommand::AddVariant {
            color: Some(color.clone()),
            size: Some(size),
            quantity: 10 * (size_index + 1),
        })?;
    }
    tracing::info!(
        variants = product.draft().variants().len(),
        stock = product.draft().total_stock(),
        stock_value = %product.draft().stock_value(),
        "Product draft ready for preview"
    );
    product.next()?;

    let route = product.submit(&orchestrator).await?;
    tracing::info!(route = ?route, "Product wizard finished");

    tracing::debug!("Metrics snapshot:\n{}", metrics.render()?);
    tracing::info!("Demo complete");

    Ok(())
}

fn seeded_backend() -> InMemoryApi {
    let colors = [("Red", "#ff0000"), ("Green", "#00ff00"), ("Blue", "#0000ff"), ("Black", "#000000")]
        .iter()
        .enumerate()
        .map(|(i, (name, code))| Color::new(format!("color-{}", i + 1), *name).with_code(*code))
        .collect();
    let sizes = ["S", "M", "L", "XL"]
        .iter()
        .enumerate()
        .map(|(i, code)| Size::new(format!("size-{}", i + 1), *code))
        .collect();
    let categories = vec![Category::new("category-1", "Shirts"), Category::new("category-2", "Pants")];

    InMemoryApi::new()
        .with_colors(colors)
        .with_sizes(sizes)
        .with_categories(categories)
}

async fn pick_color(ctx: &AdminContext, excluded: Vec<shop_admin::models::ColorId>) -> anyhow::Result<Color> {
    let mut picker = ColorPicker::new(ctx.page_size());
    ensure_applied(picker.open_and_load(ctx, excluded).await?)?;
    picker.pick(0).context("no selectable color")
}

async fn pick_size(
    ctx: &AdminContext,
    excluded: std::collections::HashSet<shop_admin::models::SizeId>,
) -> anyhow::Result<Size> {
    let mut picker = SizePicker::new(ctx.page_size());
    ensure_applied(picker.open_and_load(ctx, excluded).await?)?;
    let row = (0..picker.rows().len())
        .find(|&i| !picker.is_excluded(&picker.rows()[i]))
        .context("no selectable size")?;
    picker.pick(row).context("size row vanished")
}

async fn pick_category(ctx: &AdminContext) -> anyhow::Result<Category> {
    let mut picker = CategoryPicker::new(ctx.page_size());
    ensure_applied(picker.open_and_load(ctx, Vec::new()).await?)?;
    picker.pick(0).context("no category available")
}

fn ensure_applied(outcome: FetchOutcome) -> anyhow::Result<()> {
    match outcome {
        FetchOutcome::Applied => Ok(()),
        other => anyhow::bail!("picker fetch did not complete: {:?}", other),
    }
}
