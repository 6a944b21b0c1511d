use atletica_core::{
    ContactUpdate, Customer, CustomerRepository, NewCustomer, ShopError, ShopResult,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::validation;

/// Maintains customer records and their membership flag
pub struct CustomerRegistry {
    repo: Arc<dyn CustomerRepository>,
}

impl CustomerRegistry {
    pub fn new(repo: Arc<dyn CustomerRepository>) -> Self {
        Self { repo }
    }

    /// Register a new customer. `DuplicateKey` if the student id or email is taken.
    pub async fn register(&self, new: NewCustomer) -> ShopResult<Customer> {
        let new = NewCustomer {
            student_id: validation::student_id(&new.student_id)?,
            name: validation::name(&new.name)?,
            email: new.email.as_deref().map(validation::email).transpose()?,
            phone: new.phone.as_deref().map(validation::phone).transpose()?,
            is_member: new.is_member,
            favorite_team: new.favorite_team.as_deref().map(validation::favorite_team).transpose()?,
            home_city: new.home_city.as_deref().map(validation::home_city).transpose()?,
            watches_one_piece: new.watches_one_piece,
        };

        if self.repo.get_customer(&new.student_id).await?.is_some() {
            warn!(student_id = %new.student_id, "Registration rejected: student id already registered");
            return Err(ShopError::duplicate("customer", &new.student_id));
        }
        if let Some(email) = &new.email {
            if self.repo.find_customer_by_email(email).await?.is_some() {
                return Err(ShopError::duplicate("customer email", email));
            }
        }

        let customer = Customer::new(new);
        self.repo.insert_customer(&customer).await?;

        info!(student_id = %customer.student_id, is_member = customer.is_member, "Customer registered");
        Ok(customer)
    }

    pub async fn lookup(&self, student_id: &str) -> ShopResult<Customer> {
        self.repo
            .get_customer(student_id.trim())
            .await?
            .ok_or_else(|| ShopError::not_found("customer", student_id.trim()))
    }

    pub async fn update_membership(&self, student_id: &str, is_member: bool) -> ShopResult<Customer> {
        let mut customer = self.lookup(student_id).await?;
        customer.is_member = is_member;
        self.repo.update_customer(&customer).await?;

        info!(student_id = %customer.student_id, is_member, "Membership updated");
        Ok(customer)
    }

    /// Partial update of every non-key field except membership
    pub async fn update_contact(&self, student_id: &str, update: ContactUpdate) -> ShopResult<Customer> {
        if update.is_empty() {
            return Err(ShopError::invalid("nothing to update"));
        }

        let mut customer = self.lookup(student_id).await?;

        if let Some(name) = &update.name {
            customer.name = validation::name(name)?;
        }
        if let Some(phone) = &update.phone {
            customer.phone = Some(validation::phone(phone)?.into());
        }
        if let Some(team) = &update.favorite_team {
            customer.favorite_team = Some(validation::favorite_team(team)?);
        }
        if let Some(city) = &update.home_city {
            customer.home_city = Some(validation::home_city(city)?);
        }
        if let Some(watches) = update.watches_one_piece {
            customer.watches_one_piece = watches;
        }
        if let Some(email) = &update.email {
            let email = validation::email(email)?;
            if customer.email_str() != Some(email.as_str()) {
                let taken = self
                    .repo
                    .find_customer_by_email(&email)
                    .await?
                    .is_some_and(|other| other.student_id != customer.student_id);
                if taken {
                    return Err(ShopError::duplicate("customer email", &email));
                }
            }
            customer.email = Some(email.into());
        }

        self.repo.update_customer(&customer).await?;
        info!(student_id = %customer.student_id, "Customer contact updated");
        Ok(customer)
    }

    pub async fn list(&self) -> ShopResult<Vec<Customer>> {
        self.repo.list_customers().await
    }

    pub async fn search_by_name(&self, fragment: &str) -> ShopResult<Vec<Customer>> {
        if fragment.trim().is_empty() {
            return self.list().await;
        }
        self.repo.search_customers(fragment).await
    }

    /// Customers with recorded sales are kept (`InUse`)
    pub async fn remove(&self, student_id: &str) -> ShopResult<()> {
        self.repo.delete_customer(student_id.trim()).await?;
        info!(student_id = student_id.trim(), "Customer removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atletica_store::InMemoryStore;

    fn registry() -> CustomerRegistry {
        CustomerRegistry::new(Arc::new(InMemoryStore::new()))
    }

    fn new_customer(student_id: &str, name: &str, is_member: bool) -> NewCustomer {
        NewCustomer {
            student_id: student_id.to_string(),
            name: name.to_string(),
            is_member,
            ..NewCustomer::default()
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_registered_membership() {
        let registry = registry();
        registry.register(new_customer("20230001", "Ana Lima", true)).await.unwrap();
        registry.register(new_customer("20230002", "Bruno Costa", false)).await.unwrap();

        assert!(registry.lookup("20230001").await.unwrap().is_member);
        assert!(!registry.lookup("20230002").await.unwrap().is_member);

        registry.update_membership("20230002", true).await.unwrap();
        assert!(registry.lookup("20230002").await.unwrap().is_member);
    }

    #[tokio::test]
    async fn test_register_duplicate_student_id() {
        let registry = registry();
        registry.register(new_customer("20230001", "Ana Lima", true)).await.unwrap();

        let err = registry.register(new_customer("20230001", "Ana Souza", false)).await.unwrap_err();
        assert!(matches!(err, ShopError::DuplicateKey { .. }));
        assert_eq!(registry.lookup("20230001").await.unwrap().name, "Ana Lima");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let registry = registry();
        let mut first = new_customer("20230001", "Ana Lima", true);
        first.email = Some("ana@ufpe.br".to_string());
        registry.register(first).await.unwrap();

        let mut second = new_customer("20230002", "Bruno Costa", false);
        second.email = Some("ana@ufpe.br".to_string());
        let err = registry.register(second).await.unwrap_err();
        assert!(matches!(err, ShopError::DuplicateKey { entity: "customer email", .. }));
    }

    #[tokio::test]
    async fn test_unknown_customer_not_found() {
        let registry = registry();
        assert!(matches!(registry.lookup("99999999").await, Err(ShopError::NotFound { .. })));
        assert!(matches!(
            registry.update_membership("99999999", true).await,
            Err(ShopError::NotFound { .. })
        ));
        assert!(matches!(registry.remove("99999999").await, Err(ShopError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let registry = registry();
        let err = registry.register(new_customer("123", "Ana Lima", false)).await.unwrap_err();
        assert!(matches!(err, ShopError::InvalidValue(_)));

        let mut bad_phone = new_customer("20230003", "Carla Dias", false);
        bad_phone.phone = Some("1234".to_string());
        assert!(matches!(registry.register(bad_phone).await, Err(ShopError::InvalidValue(_))));
    }

    #[tokio::test]
    async fn test_update_contact_and_search() {
        let registry = registry();
        registry.register(new_customer("20230001", "Ana Lima", true)).await.unwrap();
        registry.register(new_customer("20230002", "Mariana Alves", false)).await.unwrap();

        let updated = registry
            .update_contact(
                "20230001",
                ContactUpdate {
                    phone: Some("(81) 99999-0000".to_string()),
                    ..ContactUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone_str(), Some("81999990000"));
        assert_eq!(updated.name, "Ana Lima");

        let found = registry.search_by_name("ANA").await.unwrap();
        let ids: Vec<&str> = found.iter().map(|c| c.student_id.as_str()).collect();
        assert_eq!(ids, vec!["20230001", "20230002"]);
    }

    #[tokio::test]
    async fn test_profile_fields_validated_and_normalized() {
        let registry = registry();
        let mut new = new_customer("20230001", "Ana Lima", false);
        new.favorite_team = Some("santa cruz".to_string());
        new.home_city = Some("olinda".to_string());
        new.watches_one_piece = true;
        let customer = registry.register(new).await.unwrap();
        assert_eq!(customer.favorite_team.as_deref(), Some("Santa Cruz"));
        assert_eq!(customer.home_city.as_deref(), Some("Olinda"));
        assert!(customer.watches_one_piece);

        let mut bad_city = new_customer("20230002", "Bruno Costa", false);
        bad_city.home_city = Some("Recife 2".to_string());
        assert!(matches!(registry.register(bad_city).await, Err(ShopError::InvalidValue(_))));

        let updated = registry
            .update_contact(
                "20230001",
                ContactUpdate {
                    home_city: Some("jaboatão dos guararapes".to_string()),
                    watches_one_piece: Some(false),
                    ..ContactUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.home_city.as_deref(), Some("Jaboatão Dos Guararapes"));
        assert!(!updated.watches_one_piece);
        assert_eq!(updated.favorite_team.as_deref(), Some("Santa Cruz"));

        let rejected = registry
            .update_contact(
                "20230001",
                ContactUpdate { favorite_team: Some("x".to_string()), ..ContactUpdate::default() },
            )
            .await;
        assert!(matches!(rejected, Err(ShopError::InvalidValue(_))));
        assert_eq!(registry.lookup("20230001").await.unwrap().favorite_team.as_deref(), Some("Santa Cruz"));
    }
}
