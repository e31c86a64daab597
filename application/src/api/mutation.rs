//! GraphQL [`Mutation`]s definitions.

use common::{Date, Percent, Price};
use juniper::graphql_object;
use service::{command, domain::rental_option, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `RentalOption` pricing the `Listing` per the provided
    /// number of units.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DURATION_NOT_POSITIVE` - the provided duration is not positive;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `LISTING_NOT_RENT` - the `Listing` with the provided ID is not a
    ///                        rent listing;
    /// - `NO_BASE_TIER` - the `Listing` has no active base `RentalOption`
    ///                    for the provided unit.
    #[tracing::instrument(
        skip_all,
        fields(
            duration = %duration,
            gql.name = "createRentalOption",
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            price = %price,
            unit = ?unit,
        ),
    )]
    pub async fn create_rental_option(
        listing_id: api::listing::Id,
        duration: i32,
        unit: api::rental_option::Unit,
        price: Price,
        ctx: &Context,
    ) -> Result<api::RentalOption, Error> {
        let duration = rental_option::Duration::new(duration)
            .ok_or_else(|| DurationError::NotPositive.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateRentalOption {
                listing_id: listing_id.into(),
                duration,
                unit: unit.into(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `RentalOption` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DURATION_NOT_POSITIVE` - the provided duration is not positive;
    /// - `LAST_BASE_TIER` - the `RentalOption` is the last active base tier
    ///                      backing other options of its unit;
    /// - `NO_BASE_TIER` - the `Listing` has no active base `RentalOption`
    ///                    for the provided unit;
    /// - `RENTAL_OPTION_NOT_EXISTS` - the `RentalOption` with the provided
    ///                                ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            duration = %duration,
            gql.name = "updateRentalOption",
            id = %id,
            otel.name = Self::SPAN_NAME,
            price = %price,
            unit = ?unit,
        ),
    )]
    pub async fn update_rental_option(
        id: api::rental_option::Id,
        duration: i32,
        unit: api::rental_option::Unit,
        price: Price,
        ctx: &Context,
    ) -> Result<api::RentalOption, Error> {
        let duration = rental_option::Duration::new(duration)
            .ok_or_else(|| DurationError::NotPositive.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateRentalOption {
                id: id.into(),
                duration,
                unit: unit.into(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `RentalOption` with the provided ID.
    ///
    /// The `RentalOption` is deactivated rather than removed, so the
    /// `Transaction`s referring it stay meaningful.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LAST_BASE_TIER` - the `RentalOption` is the last active base tier
    ///                      backing other options of its unit;
    /// - `RENTAL_OPTION_NOT_EXISTS` - the `RentalOption` with the provided
    ///                                ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelRentalOption",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_rental_option(
        id: api::rental_option::Id,
        ctx: &Context,
    ) -> Result<api::RentalOption, Error> {
        ctx.service()
            .execute(command::CancelRentalOption { id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Discount` scheduled over the provided window.
    ///
    /// The `Discount` is created inactive and is activated once its window
    /// starts.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PERIOD` - the provided window ends before it starts;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `RENTAL_OPTION_NOT_EXISTS` - the `RentalOption` with the provided
    ///                                ID does not exist;
    /// - `RENTAL_OPTION_NOT_OF_LISTING` - the `RentalOption` belongs to
    ///                                    another `Listing`;
    /// - `START_IN_PAST` - the provided window starts in the past;
    /// - `ZERO_PERCENTAGE` - the provided percentage is zero.
    #[tracing::instrument(
        skip_all,
        fields(
            end_date = %end_date,
            gql.name = "createDiscount",
            listing_id = %listing_id,
            name = %name,
            otel.name = Self::SPAN_NAME,
            percentage = %percentage,
            rental_option_id = ?rental_option_id,
            start_date = %start_date,
        ),
    )]
    pub async fn create_discount(
        listing_id: api::listing::Id,
        name: api::discount::Name,
        percentage: Percent,
        start_date: Date,
        end_date: Date,
        rental_option_id: Option<api::rental_option::Id>,
        ctx: &Context,
    ) -> Result<api::Discount, Error> {
        ctx.service()
            .execute(command::CreateDiscount {
                listing_id: listing_id.into(),
                rental_option_id: rental_option_id.map(Into::into),
                name: name.into(),
                percentage,
                start: start_date.coerce(),
                end: end_date.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Discount` with the provided ID.
    ///
    /// A `Discount` that has been active at some point is deactivated instead
    /// of being removed, keeping the `Transaction`s referring it meaningful.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `DISCOUNT_NOT_EXISTS` - the `Discount` with the provided ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteDiscount",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_discount(
        id: api::discount::Id,
        ctx: &Context,
    ) -> Result<api::discount::DeleteResult, Error> {
        ctx.service()
            .execute(command::DeleteDiscount { id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Transaction` over the specified `Listing`.
    ///
    /// `rent` transactions require a check-out day and reject windows
    /// overlapping an already booked occupancy.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_CONFLICT` - the `Listing` is already occupied over the
    ///                        provided window;
    /// - `DISCOUNT_NOT_EXISTS` - the `Discount` with the provided ID does not
    ///                           exist;
    /// - `DISCOUNT_NOT_OF_LISTING` - the `Discount` belongs to another
    ///                               `Listing`;
    /// - `INVALID_OCCUPANCY` - the check-out day doesn't strictly follow the
    ///                         check-in one;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the provided ID does not
    ///                          exist;
    /// - `LISTING_NOT_RENT` - the `Listing` with the provided ID is not a
    ///                        rent listing;
    /// - `MISSING_CHECK_OUT` - no check-out day provided for a `rent`
    ///                         transaction;
    /// - `RENTAL_OPTION_NOT_EXISTS` - the `RentalOption` with the provided
    ///                                ID does not exist;
    /// - `RENTAL_OPTION_NOT_OF_LISTING` - the `RentalOption` belongs to
    ///                                    another `Listing`;
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            amount_paid = %amount_paid,
            buyer_id = %buyer_id,
            check_in_date = %check_in_date,
            check_out_date = ?check_out_date.as_ref().map(Date::to_iso8601),
            discount_id = ?discount_id,
            gql.name = "createTransaction",
            kind = ?kind,
            listing_id = %listing_id,
            otel.name = Self::SPAN_NAME,
            payment_method = ?payment_method,
            payment_status = ?payment_status,
            rental_option_id = ?rental_option_id,
            seller_id = %seller_id,
            total_price = %total_price,
        ),
    )]
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    pub async fn create_transaction(
        kind: api::transaction::Kind,
        check_in_date: Date,
        check_out_date: Option<Date>,
        listing_id: api::listing::Id,
        buyer_id: api::user::Id,
        seller_id: api::user::Id,
        discount_id: Option<api::discount::Id>,
        rental_option_id: Option<api::rental_option::Id>,
        amount_paid: Price,
        total_price: Price,
        payment_status: api::transaction::PaymentStatus,
        payment_method: api::transaction::PaymentMethod,
        ctx: &Context,
    ) -> Result<api::TransactionValue, Error> {
        ctx.service()
            .execute(command::CreateTransaction {
                kind: kind.into(),
                listing_id: listing_id.into(),
                buyer_id: buyer_id.into(),
                seller_id: seller_id.into(),
                check_in: check_in_date.coerce(),
                check_out: check_out_date.map(Date::coerce),
                discount_id: discount_id.map(Into::into),
                rental_option_id: rental_option_id.map(Into::into),
                total_price,
                amount_paid,
                payment_status: payment_status.into(),
                payment_method: payment_method.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Transaction` with the provided ID as paid.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ALREADY_PAID` - the `Transaction` is paid already;
    /// - `TRANSACTION_NOT_EXISTS` - the `Transaction` with the provided ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markTransactionPaid",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_transaction_paid(
        id: api::transaction::Id,
        ctx: &Context,
    ) -> Result<api::TransactionValue, Error> {
        ctx.service()
            .execute(command::MarkTransactionPaid { id: id.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum DurationError {
        #[code = "DURATION_NOT_POSITIVE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`RentalOption` duration must be a positive number of \
                     units"]
        NotPositive,
    }
}

impl AsError for command::cancel_rental_option::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RENTAL_OPTION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`RentalOption` with the provided ID does not \
                             exist"]
                OptionNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::LastBaseTier { .. } => crate::Error {
                code: "LAST_BASE_TIER",
                status_code: http::StatusCode::BAD_REQUEST,
                message: self.to_string(),
                backtrace: None,
            },
            Self::OptionNotExists(_) => Error::OptionNotExists.into(),
        })
    }
}

impl AsError for command::create_discount::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_PERIOD"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Discount` window must not end before it starts"]
                InvalidPeriod,

                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,

                #[code = "RENTAL_OPTION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`RentalOption` with the provided ID does not \
                             exist"]
                OptionNotExists,

                #[code = "RENTAL_OPTION_NOT_OF_LISTING"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`RentalOption` with the provided ID doesn't \
                             belong to the `Listing`"]
                OptionNotOfListing,

                #[code = "START_IN_PAST"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Discount` window must not start in the past"]
                StartInPast,

                #[code = "ZERO_PERCENTAGE"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Discount` percentage must be greater than zero"]
                ZeroPercentage,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidPeriod { .. } => Error::InvalidPeriod.into(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::OptionNotExists(_) => Error::OptionNotExists.into(),
            Self::OptionNotOfListing { .. } => Error::OptionNotOfListing.into(),
            Self::StartInPast(_) => Error::StartInPast.into(),
            Self::ZeroPercentage => Error::ZeroPercentage.into(),
        })
    }
}

impl AsError for command::create_rental_option::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,

                #[code = "LISTING_NOT_RENT"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Listing` with the provided ID is not a rent \
                             listing"]
                ListingNotRent,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::ListingNotRent(_) => Error::ListingNotRent.into(),
            Self::NoBaseTier { .. } => crate::Error {
                code: "NO_BASE_TIER",
                status_code: http::StatusCode::BAD_REQUEST,
                message: self.to_string(),
                backtrace: None,
            },
        })
    }
}

impl AsError for command::create_transaction::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DISCOUNT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Discount` with the provided ID does not exist"]
                DiscountNotExists,

                #[code = "DISCOUNT_NOT_OF_LISTING"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Discount` with the provided ID doesn't belong \
                             to the `Listing`"]
                DiscountNotOfListing,

                #[code = "INVALID_OCCUPANCY"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "Check-out day must strictly follow the check-in \
                             one"]
                InvalidOccupancy,

                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the provided ID does not exist"]
                ListingNotExists,

                #[code = "LISTING_NOT_RENT"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`Listing` with the provided ID is not a rent \
                             listing"]
                ListingNotRent,

                #[code = "MISSING_CHECK_OUT"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`rent` transaction requires a check-out day"]
                MissingCheckOut,

                #[code = "RENTAL_OPTION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`RentalOption` with the provided ID does not \
                             exist"]
                OptionNotExists,

                #[code = "RENTAL_OPTION_NOT_OF_LISTING"]
                #[status = UNPROCESSABLE_ENTITY]
                #[message = "`RentalOption` with the provided ID doesn't \
                             belong to the `Listing`"]
                OptionNotOfListing,

                #[code = "USER_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`User` with the provided ID does not exist"]
                UserNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BookingConflict { .. } => crate::Error {
                code: "BOOKING_CONFLICT",
                status_code: http::StatusCode::CONFLICT,
                message: self.to_string(),
                backtrace: None,
            },
            Self::DiscountNotExists(_) => Error::DiscountNotExists.into(),
            Self::DiscountNotOfListing { .. } => {
                Error::DiscountNotOfListing.into()
            }
            Self::InvalidOccupancy { .. } => Error::InvalidOccupancy.into(),
            Self::ListingNotExists(_) => Error::ListingNotExists.into(),
            Self::ListingNotRent(_) => Error::ListingNotRent.into(),
            Self::MissingCheckOut => Error::MissingCheckOut.into(),
            Self::OptionNotExists(_) => Error::OptionNotExists.into(),
            Self::OptionNotOfListing { .. } => Error::OptionNotOfListing.into(),
            Self::UserNotExists(_) => Error::UserNotExists.into(),
        })
    }
}

impl AsError for command::delete_discount::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DISCOUNT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Discount` with the provided ID does not exist"]
                DiscountNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::DiscountNotExists(_) => Error::DiscountNotExists.into(),
        })
    }
}

impl AsError for command::mark_transaction_paid::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_PAID"]
                #[status = BAD_REQUEST]
                #[message = "`Transaction` with the provided ID is paid \
                             already"]
                AlreadyPaid,

                #[code = "TRANSACTION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Transaction` with the provided ID does not \
                             exist"]
                TransactionNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::AlreadyPaid(_) => Error::AlreadyPaid.into(),
            Self::TransactionNotExists(_) => {
                Error::TransactionNotExists.into()
            }
        })
    }
}

impl AsError for command::update_rental_option::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "RENTAL_OPTION_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`RentalOption` with the provided ID does not \
                             exist"]
                OptionNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::LastBaseTier { .. } => crate::Error {
                code: "LAST_BASE_TIER",
                status_code: http::StatusCode::BAD_REQUEST,
                message: self.to_string(),
                backtrace: None,
            },
            Self::NoBaseTier { .. } => crate::Error {
                code: "NO_BASE_TIER",
                status_code: http::StatusCode::BAD_REQUEST,
                message: self.to_string(),
                backtrace: None,
            },
            Self::OptionNotExists(_) => Error::OptionNotExists.into(),
        })
    }
}
