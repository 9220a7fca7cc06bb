use crate::channel::ChannelId;
use crate::model::Row;

/// Header assertion for a fixed layout: `column` in the first row must
/// contain `keyword`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCheck {
    pub column: String,
    pub keyword: String,
}

/// Where each shipping field lives in a channel's spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMap {
    pub recipient_name: String,
    pub phone: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub message: Option<String>,
    /// Space-joined in order, empty cells dropped.
    pub product_name: Vec<String>,
    pub quantity: Option<String>,
    pub header_check: Option<HeaderCheck>,
    /// Index of the first data row; 0 means "right after the header".
    pub skip_rows: usize,
}

/// Column layout resolved for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMapping {
    Fixed(ColumnMap),
    /// Find the header row by keyword scan.
    AutoDetect,
}

struct Layout<'a> {
    recipient: &'a str,
    phone: &'a str,
    postal: Option<&'a str>,
    address: &'a str,
    message: Option<&'a str>,
    product: &'a [&'a str],
    quantity: &'a str,
    check: Option<(&'a str, &'a str)>,
    skip_rows: usize,
}

impl Layout<'_> {
    fn build(&self) -> ColumnMap {
        ColumnMap {
            recipient_name: self.recipient.to_string(),
            phone: Some(self.phone.to_string()),
            postal_code: self.postal.map(str::to_string),
            address: Some(self.address.to_string()),
            message: self.message.map(str::to_string),
            product_name: self.product.iter().map(|c| c.to_string()).collect(),
            quantity: Some(self.quantity.to_string()),
            header_check: self.check.map(|(column, keyword)| HeaderCheck {
                column: column.to_string(),
                keyword: keyword.to_string(),
            }),
            skip_rows: self.skip_rows,
        }
    }
}

const IWON: Layout<'static> = Layout {
    recipient: "I",
    phone: "J",
    postal: Some("L"),
    address: "M",
    message: Some("N"),
    product: &["D"],
    quantity: "E",
    check: Some(("I", "수취인")),
    skip_rows: 0,
};

const KAKAO: Layout<'static> = Layout {
    recipient: "O",
    phone: "P",
    postal: Some("T"),
    address: "R",
    message: Some("S"),
    product: &["E", "F"],
    quantity: "G",
    check: Some(("O", "수령인")),
    skip_rows: 0,
};

const PALDOGAM: Layout<'static> = Layout {
    recipient: "C",
    phone: "G",
    postal: Some("D"),
    address: "E",
    message: Some("F"),
    product: &["J", "L"],
    quantity: "N",
    check: Some(("C", "수령인")),
    skip_rows: 0,
};

// Naver exports carry no postal code; C is the merged delivery address.
const NAVER: Layout<'static> = Layout {
    recipient: "A",
    phone: "B",
    postal: None,
    address: "C",
    message: Some("G"),
    product: &["D", "E"],
    quantity: "F",
    check: Some(("A", "수취인")),
    skip_rows: 0,
};

// Vendor order sheets with a three-row physical header.
const VENDOR_MULTI_HEADER: Layout<'static> = Layout {
    recipient: "G",
    phone: "H",
    postal: Some("J"),
    address: "K",
    message: Some("L"),
    product: &["B"],
    quantity: "C",
    check: None,
    skip_rows: 3,
};

const CRAZY: Layout<'static> = Layout {
    recipient: "A",
    phone: "B",
    postal: Some("C"),
    address: "D",
    message: Some("G"),
    product: &["F"],
    quantity: "E",
    check: Some(("A", "받는")),
    skip_rows: 0,
};

enum VendorLayout {
    Fixed(&'static Layout<'static>),
    AutoDetect,
}

/// Vendors of the generic channel, matched by file-name substring in order.
const GENERIC_VENDORS: &[(&str, VendorLayout)] = &[
    ("잇템커머스", VendorLayout::Fixed(&VENDOR_MULTI_HEADER)),
    ("포앤서치", VendorLayout::Fixed(&VENDOR_MULTI_HEADER)),
    ("캄므커머스", VendorLayout::Fixed(&VENDOR_MULTI_HEADER)),
    ("크레이지", VendorLayout::Fixed(&CRAZY)),
    ("J우리곡간", VendorLayout::AutoDetect),
    ("브랜딩리드", VendorLayout::AutoDetect),
];

/// Resolve the column layout for a channel, using the file name to pick a
/// vendor within the generic channel.
pub fn column_map_for(channel: ChannelId, file_name: &str) -> ColumnMapping {
    let layout = match channel {
        ChannelId::Iwon => &IWON,
        ChannelId::Kakao => &KAKAO,
        ChannelId::Paldogam => &PALDOGAM,
        ChannelId::JiktaebaeNaver | ChannelId::PaldogamNaver => &NAVER,
        ChannelId::JiktaebaeGeneric => {
            return match GENERIC_VENDORS
                .iter()
                .find(|(vendor, _)| file_name.contains(vendor))
                .map(|(_, layout)| layout)
            {
                Some(VendorLayout::Fixed(layout)) => ColumnMapping::Fixed(layout.build()),
                Some(VendorLayout::AutoDetect) | None => ColumnMapping::AutoDetect,
            };
        }
    };
    ColumnMapping::Fixed(layout.build())
}

const RECIPIENT_KEYWORDS: &[&str] = &["받는분", "받는사람", "수취인", "수령인", "수령자", "성명"];
const PHONE_KEYWORDS: &[&str] = &["전화", "연락처", "핸드폰", "휴대폰", "HP"];
const POSTAL_KEYWORDS: &[&str] = &["우편번호", "우편", "zipcode"];
const ADDRESS_KEYWORDS: &[&str] = &["주소", "배송지", "수령지"];
const MESSAGE_KEYWORDS: &[&str] = &["메세지", "메모", "요청사항", "배송메세지"];
const PRODUCT_KEYWORDS: &[&str] = &["상품명", "품목명", "품목"];
const QUANTITY_KEYWORDS: &[&str] = &["수량", "내품수량"];

/// Header text naming the consignee rather than the buyer.
const RECIPIENT_PREFIXES: &[&str] = &["수령자", "수령인", "받는분", "받는사람", "수취인"];

/// Guess a column map from a candidate header row.
///
/// For every field the first matching column wins, unless a later one also
/// names the recipient (e.g. "수령인 연락처" over "주문자 연락처"). Returns
/// `None` when no recipient-name column is found.
pub fn auto_detect_columns(header: &Row) -> Option<ColumnMap> {
    let cells: Vec<(String, String)> = header
        .iter()
        .map(|(label, cell)| {
            let text: String = cell.to_string().chars().filter(|c| !c.is_whitespace()).collect();
            (label.as_str().to_string(), text)
        })
        .collect();

    let detect = |keywords: &[&str]| -> Option<String> {
        let mut best: Option<(&str, bool)> = None;
        for (label, text) in &cells {
            if !keywords.iter().any(|kw| text.contains(kw)) {
                continue;
            }
            let names_recipient = RECIPIENT_PREFIXES.iter().any(|p| text.contains(p));
            match best {
                None => best = Some((label.as_str(), names_recipient)),
                Some((_, false)) if names_recipient => best = Some((label.as_str(), true)),
                _ => {}
            }
        }
        best.map(|(label, _)| label.to_string())
    };

    let recipient_name = detect(RECIPIENT_KEYWORDS)?;

    Some(ColumnMap {
        recipient_name,
        phone: detect(PHONE_KEYWORDS),
        postal_code: detect(POSTAL_KEYWORDS),
        address: detect(ADDRESS_KEYWORDS),
        message: detect(MESSAGE_KEYWORDS),
        product_name: detect(PRODUCT_KEYWORDS).into_iter().collect(),
        quantity: detect(QUANTITY_KEYWORDS),
        header_check: None,
        skip_rows: 0,
    })
}
