pub mod customer;
pub mod item;
pub mod review;

use crate::cli::error::{CliError, CliResult};
use crate::db::{PageSort, SortOrder};

/// Common pagination and sorting parameters for all list commands
#[derive(Debug, Default)]
pub struct PageParams<'a> {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<&'a str>,
    pub order: Option<&'a str>,
}

impl PageParams<'_> {
    pub fn to_page_sort(&self) -> CliResult<PageSort> {
        let sort_order = self
            .order
            .map(|o| o.parse::<SortOrder>())
            .transpose()
            .map_err(|message| CliError::InvalidArgument { message })?;

        Ok(PageSort {
            limit: self.limit,
            offset: self.offset,
            sort_by: self.sort.map(str::to_string),
            sort_order,
        })
    }
}

#[cfg(test)]
#[path = "customer_test.rs"]
mod customer_test;

#[cfg(test)]
#[path = "item_test.rs"]
mod item_test;

#[cfg(test)]
#[path = "review_test.rs"]
mod review_test;
