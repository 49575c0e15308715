// src/ingest/providers/companies.rs
//! Company boards polled on each ATS platform: (slug, display name).

pub const GREENHOUSE: &[(&str, &str)] = &[
    ("airbnb", "Airbnb"),
    ("databricks", "Databricks"),
    ("snowflakecomputing", "Snowflake"),
    ("confluent", "Confluent"),
    ("dbtlabs", "dbt Labs"),
    ("fivetran", "Fivetran"),
    ("hightouch", "Hightouch"),
    ("amplitude", "Amplitude"),
    ("coinbase", "Coinbase"),
    ("robinhood", "Robinhood"),
    ("plaid", "Plaid"),
    ("brex", "Brex"),
    ("chime", "Chime"),
    ("gusto", "Gusto"),
    ("asana", "Asana"),
    ("vercel", "Vercel"),
    ("datadog", "Datadog"),
    ("elastic", "Elastic"),
    ("mongodb", "MongoDB"),
    ("cloudflare", "Cloudflare"),
    ("lyft", "Lyft"),
    ("doordash", "DoorDash"),
    ("instacart", "Instacart"),
    ("stripe", "Stripe"),
    ("palantir", "Palantir"),
    ("anthropic", "Anthropic"),
    ("anyscale", "Anyscale"),
    ("dagster", "Dagster"),
    ("starburst", "Starburst"),
    ("clickhouse", "ClickHouse"),
    ("motherduck", "MotherDuck"),
    ("airbyte", "Airbyte"),
    ("metabase", "Metabase"),
    ("sigma", "Sigma Computing"),
    ("atlan", "Atlan"),
    ("tinybird", "Tinybird"),
    ("weaviate", "Weaviate"),
    ("scale", "Scale AI"),
    ("pinterest", "Pinterest"),
    ("yelp", "Yelp"),
];

pub const LEVER: &[(&str, &str)] = &[
    ("netflix", "Netflix"),
    ("figma", "Figma"),
    ("airtable", "Airtable"),
    ("retool", "Retool"),
    ("discord", "Discord"),
    ("pagerduty", "PagerDuty"),
    ("atlassian", "Atlassian"),
    ("circleci", "CircleCI"),
    ("opendoor", "Opendoor"),
    ("redfin", "Redfin"),
    ("sofi", "SoFi"),
    ("nerdwallet", "NerdWallet"),
    ("workiva", "Workiva"),
    ("gong", "Gong"),
    ("launchdarkly", "LaunchDarkly"),
    ("honeycomb", "Honeycomb"),
    ("chronosphere", "Chronosphere"),
    ("grafana", "Grafana Labs"),
    ("newrelic", "New Relic"),
];

pub const ASHBY: &[(&str, &str)] = &[
    ("ramp", "Ramp"),
    ("perplexity", "Perplexity"),
    ("replit", "Replit"),
    ("posthog", "PostHog"),
    ("together", "Together AI"),
    ("clay", "Clay"),
    ("evidence", "Evidence"),
    ("rill", "Rill Data"),
    ("chalk", "Chalk"),
    ("vectara", "Vectara"),
    ("labelbox", "Labelbox"),
    ("roboflow", "Roboflow"),
];

pub const SMARTRECRUITERS: &[(&str, &str)] = &[
    ("intel", "Intel"),
    ("bosch", "Bosch USA"),
    ("capgemini", "Capgemini"),
    ("cognizant", "Cognizant"),
    ("infosys", "Infosys"),
    ("epam", "EPAM Systems"),
    ("globant", "Globant"),
    ("hpe", "HPE"),
];

/// (tenant, career site, `wdN` data centre, display name)
pub const WORKDAY: &[(&str, &str, u8, &str)] = &[
    ("apple", "apple", 5, "Apple"),
    ("salesforce", "salesforce", 12, "Salesforce"),
    ("adobe", "adobe", 5, "Adobe"),
    ("nvidia", "nvidia", 5, "Nvidia"),
    ("cisco", "cisco", 5, "Cisco"),
    ("paypal", "paypal", 1, "PayPal"),
    ("okta", "okta", 1, "Okta"),
    ("intuit", "intuit", 5, "Intuit"),
    ("walmart", "walmart", 5, "Walmart"),
    ("target", "Target_External_Site", 5, "Target"),
    ("capitalone", "capitalone", 5, "Capital One"),
    ("wellsfargo", "wellsfargo", 5, "Wells Fargo"),
    ("jpmorgan", "jpmorganchase", 5, "JPMorgan Chase"),
    ("mastercard", "mastercard", 5, "Mastercard"),
    ("cvs", "cvs", 5, "CVS Health"),
    ("humana", "humana", 5, "Humana"),
    ("boeing", "boeing", 5, "Boeing"),
    ("lockheedmartin", "lockheedmartin", 5, "Lockheed Martin"),
    ("disney", "disney", 5, "Disney"),
    ("comcast", "comcast", 5, "Comcast"),
];
