//! Canonical column names for the three extracts and the consolidated table.
//!
//! Source columns keep the headers the upstream systems export; derived
//! columns use the names the reporting layer reads.

// Inventory
pub const SKU_ID: &str = "SKU_ID";
pub const CATEGORY: &str = "Categoria";
pub const UNIT_COST: &str = "Costo_Unitario_USD";
pub const REORDER_POINT: &str = "Punto_Reorden";
pub const CURRENT_STOCK: &str = "Stock_Actual";
pub const WAREHOUSE: &str = "Bodega_Origen";
pub const LEAD_TIME_DAYS: &str = "Lead_Time_Dias";
pub const LAST_REVIEW_DATE: &str = "Ultima_Revision";

pub const INVENTORY_COLUMNS: [&str; 8] = [
    SKU_ID,
    CATEGORY,
    UNIT_COST,
    REORDER_POINT,
    CURRENT_STOCK,
    WAREHOUSE,
    LEAD_TIME_DAYS,
    LAST_REVIEW_DATE,
];

/// Inventory fields carried into the consolidated table.
pub const INVENTORY_JOIN_FIELDS: [&str; 7] = [
    CATEGORY,
    UNIT_COST,
    REORDER_POINT,
    CURRENT_STOCK,
    WAREHOUSE,
    LEAD_TIME_DAYS,
    LAST_REVIEW_DATE,
];

// Feedback
pub const TRANSACTION_ID: &str = "Transaccion_ID";
pub const NPS_RAW: &str = "Satisfaccion_NPS";
pub const PRODUCT_RATING: &str = "Rating_Producto";
pub const CUSTOMER_AGE: &str = "Edad_Cliente";
pub const SUPPORT_TICKET_RAW: &str = "Ticket_Soporte_Abierto";
pub const NPS_NORMALIZED: &str = "NPSNormalized";
pub const NPS_CATEGORY: &str = "NPSCategory";
pub const SUPPORT_TICKET_FLAG: &str = "SupportTicketFlag";

pub const FEEDBACK_COLUMNS: [&str; 5] = [
    TRANSACTION_ID,
    NPS_RAW,
    PRODUCT_RATING,
    CUSTOMER_AGE,
    SUPPORT_TICKET_RAW,
];

/// Feedback fields carried into the consolidated table.
pub const FEEDBACK_JOIN_FIELDS: [&str; 5] = [
    NPS_NORMALIZED,
    NPS_CATEGORY,
    PRODUCT_RATING,
    CUSTOMER_AGE,
    SUPPORT_TICKET_FLAG,
];

// Transactions
pub const SALE_DATE: &str = "Fecha_Venta";
pub const QUANTITY: &str = "Cantidad_Vendida";
pub const FINAL_PRICE: &str = "Precio_Venta_Final";
pub const SHIPPING_COST: &str = "Costo_Envio";
pub const DESTINATION_CITY: &str = "Ciudad_Destino";
pub const SALES_CHANNEL: &str = "Canal_Venta";
pub const DELIVERY_TIME: &str = "Tiempo_Entrega";

pub const TRANSACTION_COLUMNS: [&str; 8] = [
    TRANSACTION_ID,
    SKU_ID,
    SALE_DATE,
    QUANTITY,
    FINAL_PRICE,
    SHIPPING_COST,
    DESTINATION_CITY,
    SALES_CHANNEL,
];

// Derived
pub const REVENUE: &str = "Revenue";
pub const COST: &str = "Cost";
pub const MARGIN: &str = "Margin";
pub const DELIVERY_GAP: &str = "DeliveryGap";
pub const NO_INVENTORY_FLAG: &str = "NoInventoryFlag";
pub const LOYALTY_PARADOX_FLAG: &str = "LoyaltyParadoxFlag";
