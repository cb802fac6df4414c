use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use voyage_core::repository::{ReservationStore, StoreError};
use voyage_core::reservation::{
    FlightDetails, HotelDetails, Reservation, ReservationStatus, ReservationType,
};

pub struct StoreReservationRepository {
    pool: PgPool,
}

impl StoreReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn assemble(&self, row: ReservationRow) -> Result<Reservation, StoreError> {
        let flight = sqlx::query_as::<_, FlightDetailsRow>(
            "SELECT reservation_id, external_flight_id, origin, destination, departure_date, return_date, airline, flight_number, price, passengers, itinerary FROM reservation_flights WHERE reservation_id = $1",
        )
        .bind(row.id)
        .fetch_optional(&self.pool)
        .await?;

        let hotel = sqlx::query_as::<_, HotelDetailsRow>(
            "SELECT reservation_id, external_hotel_id, hotel_name, city, address, check_in, check_out, room_count, price_per_night, total_price, nights, rating, image_url FROM reservation_hotels WHERE reservation_id = $1",
        )
        .bind(row.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Reservation {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            kind: ReservationType::parse(&row.kind).ok_or_else(|| {
                voyage_core::CoreError::Internal(format!("unknown reservation type '{}'", row.kind))
            })?,
            status: ReservationStatus::parse(&row.status).ok_or_else(|| {
                voyage_core::CoreError::Internal(format!(
                    "unknown reservation status '{}'",
                    row.status
                ))
            })?,
            total_price: row.total_price,
            flight: flight.map(FlightDetailsRow::into_details),
            hotel: hotel.map(HotelDetailsRow::into_details),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    user_id: Uuid,
    user_email: String,
    kind: String,
    status: String,
    total_price: f64,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct FlightDetailsRow {
    #[allow(dead_code)]
    reservation_id: Uuid,
    external_flight_id: String,
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    airline: Option<String>,
    flight_number: Option<String>,
    price: f64,
    passengers: Option<i32>,
    itinerary: Option<String>,
}

impl FlightDetailsRow {
    fn into_details(self) -> FlightDetails {
        FlightDetails {
            external_flight_id: self.external_flight_id,
            origin: self.origin,
            destination: self.destination,
            departure_date: self.departure_date,
            return_date: self.return_date,
            airline: self.airline,
            flight_number: self.flight_number,
            price: self.price,
            passengers: self.passengers,
            itinerary: self
                .itinerary
                .and_then(|raw| serde_json::from_str(&raw).ok()),
        }
    }
}

#[derive(sqlx::FromRow)]
struct HotelDetailsRow {
    #[allow(dead_code)]
    reservation_id: Uuid,
    external_hotel_id: String,
    hotel_name: String,
    city: String,
    address: Option<String>,
    check_in: NaiveDate,
    check_out: NaiveDate,
    room_count: i32,
    price_per_night: f64,
    total_price: f64,
    nights: Option<i32>,
    rating: Option<f64>,
    image_url: Option<String>,
}

impl HotelDetailsRow {
    fn into_details(self) -> HotelDetails {
        HotelDetails {
            external_hotel_id: self.external_hotel_id,
            hotel_name: self.hotel_name,
            city: self.city,
            address: self.address,
            check_in: self.check_in,
            check_out: self.check_out,
            room_count: self.room_count,
            price_per_night: self.price_per_night,
            total_price: self.total_price,
            nights: self.nights,
            rating: self.rating,
            image_url: self.image_url,
        }
    }
}

#[async_trait]
impl ReservationStore for StoreReservationRepository {
    async fn create(&self, reservation: &Reservation) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO reservations (id, user_id, user_email, kind, status, total_price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.user_id)
        .bind(&reservation.user_email)
        .bind(reservation.kind.as_str())
        .bind(reservation.status.as_str())
        .bind(reservation.total_price)
        .bind(reservation.created_at)
        .execute(&mut *tx)
        .await?;

        if let Some(flight) = &reservation.flight {
            sqlx::query(
                r#"
                INSERT INTO reservation_flights (reservation_id, external_flight_id, origin, destination, departure_date, return_date, airline, flight_number, price, passengers, itinerary)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(reservation.id)
            .bind(&flight.external_flight_id)
            .bind(&flight.origin)
            .bind(&flight.destination)
            .bind(flight.departure_date)
            .bind(flight.return_date)
            .bind(&flight.airline)
            .bind(&flight.flight_number)
            .bind(flight.price)
            .bind(flight.passengers)
            .bind(flight.itinerary.as_ref().map(|v| v.to_string()))
            .execute(&mut *tx)
            .await?;
        }

        if let Some(hotel) = &reservation.hotel {
            sqlx::query(
                r#"
                INSERT INTO reservation_hotels (reservation_id, external_hotel_id, hotel_name, city, address, check_in, check_out, room_count, price_per_night, total_price, nights, rating, image_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(reservation.id)
            .bind(&hotel.external_hotel_id)
            .bind(&hotel.hotel_name)
            .bind(&hotel.city)
            .bind(&hotel.address)
            .bind(hotel.check_in)
            .bind(hotel.check_out)
            .bind(hotel.room_count)
            .bind(hotel.price_per_night)
            .bind(hotel.total_price)
            .bind(hotel.nights)
            .bind(hotel.rating)
            .bind(&hotel.image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(reservation_id = %reservation.id, user = %reservation.user_email, "reservation created");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, StoreError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "SELECT id, user_id, user_email, kind, status, total_price, created_at FROM reservations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            "SELECT id, user_id, user_email, kind, status, total_price, created_at FROM reservations WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut reservations = Vec::with_capacity(rows.len());
        for row in rows {
            reservations.push(self.assemble(row).await?);
        }
        Ok(reservations)
    }

    async fn list_all(&self) -> Result<Vec<Reservation>, StoreError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            "SELECT id, user_id, user_email, kind, status, total_price, created_at FROM reservations ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut reservations = Vec::with_capacity(rows.len());
        for row in rows {
            reservations.push(self.assemble(row).await?);
        }
        Ok(reservations)
    }

    async fn set_status(&self, id: Uuid, status: ReservationStatus) -> Result<(), StoreError> {
        sqlx::query("UPDATE reservations SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
