//! Test Helpers

use crate::{
    domain::{
        carts::{CartsService, data::NewCartItem, records::CartItemView},
        inventory::{InventoryService, data::SizeQuantity, records::Size},
        orders::{
            OrdersService,
            data::{DeliveryDetails, NewOrder, NewOrderItem},
            records::{OrderRecord, OrderUuid, PaymentMethod},
        },
        products::{
            ProductsService,
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
        },
        sellers::{
            SellersService,
            data::NewSeller,
            records::{SellerRecord, SellerUuid},
        },
        users::{
            UsersService,
            data::NewUser,
            records::{UserRecord, UserUuid},
        },
    },
    test::TestContext,
};

type HelperResult<T> = Result<T, Box<dyn std::error::Error>>;

pub(crate) async fn create_user(ctx: &TestContext) -> HelperResult<UserRecord> {
    let uuid = UserUuid::new();

    let user = ctx
        .users
        .create_user(NewUser {
            uuid,
            name: "Test User".to_string(),
            email: format!("user-{uuid}@example.com"),
        })
        .await?;

    Ok(user)
}

/// Creates a seller together with the user account that owns it.
pub(crate) async fn create_seller(ctx: &TestContext) -> HelperResult<SellerRecord> {
    let user = create_user(ctx).await?;
    let uuid = SellerUuid::new();

    let seller = ctx
        .sellers
        .create_seller(NewSeller {
            uuid,
            user_uuid: user.uuid,
            name: format!("Shop {uuid}"),
        })
        .await?;

    Ok(seller)
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    seller: SellerUuid,
    price: u64,
    stocks: &[(Size, u64)],
) -> HelperResult<ProductRecord> {
    let uuid = ProductUuid::new();

    let created = ctx
        .products
        .create_product(NewProduct {
            uuid,
            seller_uuid: seller,
            name: format!("Product {uuid}"),
            price,
            stocks: stocks
                .iter()
                .map(|&(size, quantity)| SizeQuantity { size, quantity })
                .collect(),
        })
        .await?;

    Ok(created.product)
}

pub(crate) async fn add_item(
    ctx: &TestContext,
    user: UserUuid,
    product: ProductUuid,
    size: Size,
    quantity: u64,
) -> HelperResult<CartItemView> {
    let item = ctx
        .carts
        .add_item(NewCartItem {
            user_uuid: user,
            product_uuid: product,
            size,
            quantity,
        })
        .await?;

    Ok(item)
}

/// Places a small direct order from a fresh buyer, seller and product.
pub(crate) async fn place_order(ctx: &TestContext) -> HelperResult<OrderRecord> {
    let buyer = create_user(ctx).await?;
    let seller = create_seller(ctx).await?;
    let product = create_product(ctx, seller.uuid, 1500, &[(Size::M, 10)]).await?;
    let unit = ctx.inventory.get_unit(product.uuid, Size::M).await?;

    let details = ctx
        .orders
        .create_order(NewOrder {
            uuid: OrderUuid::new(),
            user_uuid: buyer.uuid,
            seller_uuid: seller.uuid,
            delivery: DeliveryDetails {
                phone_number: "0123456789".to_string(),
                address: "12 Rue des Capucines".to_string(),
                postal_code: Some("75001".to_string()),
                payment_method: PaymentMethod::Cod,
            },
            items: vec![NewOrderItem {
                size_stock_uuid: unit.uuid,
                quantity: 1,
                price: 1500,
            }],
        })
        .await?;

    Ok(details.order)
}
